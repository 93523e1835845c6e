use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{BorrowingId, Charge, PaymentId};

/// 支払いステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    /// 支払い待ち
    Pending,
    /// 支払い済み
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Paid => "PAID",
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(PaymentStatus::Pending),
            "PAID" => Ok(PaymentStatus::Paid),
            _ => Err(format!("Invalid payment status: {}", s)),
        }
    }
}

/// 支払い種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentType {
    /// 通常のレンタル料金
    Payment,
    /// 延滞料金
    Fine,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Payment => "PAYMENT",
            PaymentType::Fine => "FINE",
        }
    }
}

impl std::str::FromStr for PaymentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PAYMENT" => Ok(PaymentType::Payment),
            "FINE" => Ok(PaymentType::Fine),
            _ => Err(format!("Invalid payment type: {}", s)),
        }
    }
}

/// 外部決済セッションへの参照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSessionRef {
    pub session_id: String,
    pub session_url: String,
}

/// Payment集約 - 貸出に紐づく請求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub payment_id: PaymentId,
    pub borrowing_id: BorrowingId,
    pub status: PaymentStatus,
    pub payment_type: PaymentType,
    pub money_to_pay: Decimal,
    pub session: Option<CheckoutSessionRef>,

    // 監査情報
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 純粋関数：請求を作成する
///
/// 請求なし（`Charge::NoCharge`）の場合は`None`を返す。
/// 作成直後のステータスは常にPENDING。
pub fn open_payment(
    borrowing_id: BorrowingId,
    charge: Charge,
    now: DateTime<Utc>,
) -> Option<Payment> {
    let payment_type = charge.payment_type()?;

    // 金額は常に小数点以下2桁で保持する
    let mut money_to_pay = charge.amount().round_dp(2);
    money_to_pay.rescale(2);

    Some(Payment {
        payment_id: PaymentId::new(),
        borrowing_id,
        status: PaymentStatus::Pending,
        payment_type,
        money_to_pay,
        session: None,
        created_at: now,
        updated_at: now,
    })
}

/// 純粋関数：決済セッションを紐づける
pub fn attach_session(payment: Payment, session: CheckoutSessionRef, now: DateTime<Utc>) -> Payment {
    Payment {
        session: Some(session),
        updated_at: now,
        ..payment
    }
}

/// 純粋関数：支払い完了にする
///
/// 既にPAIDの場合は変更なし（冪等）。
pub fn mark_paid(payment: Payment, now: DateTime<Utc>) -> Payment {
    transition(payment, PaymentStatus::Paid, now)
}

/// 純粋関数：支払い待ちに戻す（決済キャンセル時）
pub fn mark_pending(payment: Payment, now: DateTime<Utc>) -> Payment {
    transition(payment, PaymentStatus::Pending, now)
}

fn transition(payment: Payment, status: PaymentStatus, now: DateTime<Utc>) -> Payment {
    if payment.status == status {
        return payment;
    }
    Payment {
        status,
        updated_at: now,
        ..payment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_payment_for_rental_charge() {
        let borrowing_id = BorrowingId::new();
        let now = Utc::now();

        let payment = open_payment(borrowing_id, Charge::Payment(Decimal::new(70, 0)), now).unwrap();

        assert_eq!(payment.borrowing_id, borrowing_id);
        assert_eq!(payment.status, PaymentStatus::Pending);
        assert_eq!(payment.payment_type, PaymentType::Payment);
        assert_eq!(payment.money_to_pay, Decimal::new(7000, 2));
        assert!(payment.session.is_none());
    }

    #[test]
    fn test_open_payment_for_fine() {
        let payment = open_payment(
            BorrowingId::new(),
            Charge::Fine(Decimal::new(6000, 2)),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(payment.payment_type, PaymentType::Fine);
    }

    #[test]
    fn test_open_payment_without_charge() {
        assert!(open_payment(BorrowingId::new(), Charge::NoCharge, Utc::now()).is_none());
    }

    #[test]
    fn test_status_transitions() {
        let now = Utc::now();
        let payment = open_payment(BorrowingId::new(), Charge::Payment(Decimal::ONE), now).unwrap();
        let payment = attach_session(
            payment,
            CheckoutSessionRef {
                session_id: "cs_test_1".to_string(),
                session_url: "https://checkout.example/cs_test_1".to_string(),
            },
            now,
        );

        let later = now + chrono::Duration::minutes(1);
        let paid = mark_paid(payment, later);
        assert_eq!(paid.status, PaymentStatus::Paid);
        assert_eq!(paid.updated_at, later);

        // 冪等：既にPAIDならupdated_atも変わらない
        let paid_again = mark_paid(paid.clone(), later + chrono::Duration::minutes(1));
        assert_eq!(paid_again, paid);

        let pending = mark_pending(paid, later + chrono::Duration::minutes(2));
        assert_eq!(pending.status, PaymentStatus::Pending);
        assert!(pending.session.is_some());
    }

    #[test]
    fn test_status_string_round_trip() {
        assert_eq!("PAID".parse::<PaymentStatus>(), Ok(PaymentStatus::Paid));
        assert_eq!(PaymentType::Fine.as_str(), "FINE");
        assert!("REFUNDED".parse::<PaymentStatus>().is_err());
    }
}
