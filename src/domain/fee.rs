use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{DailyFee, PaymentType};

/// 延滞係数（延滞料金は日額の2倍）
pub const OVERDUE_COEFFICIENT: i64 = 2;

/// 料金計算の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "amount")]
pub enum Charge {
    /// 通常のレンタル料金
    Payment(Decimal),
    /// 延滞料金
    Fine(Decimal),
    /// 請求なし
    NoCharge,
}

impl Charge {
    pub fn amount(&self) -> Decimal {
        match self {
            Charge::Payment(amount) | Charge::Fine(amount) => *amount,
            Charge::NoCharge => Decimal::ZERO,
        }
    }

    /// 支払いセッション作成時に使う種別
    pub fn payment_type(&self) -> Option<PaymentType> {
        match self {
            Charge::Payment(_) => Some(PaymentType::Payment),
            Charge::Fine(_) => Some(PaymentType::Fine),
            Charge::NoCharge => None,
        }
    }
}

/// 純粋関数：料金を計算する
///
/// ビジネスルール：
/// - 未返却：(返却予定日 - 貸出日) × 日額。同日の場合も最低1日分を請求する
/// - 返却予定日より後に返却：(返却日 - 返却予定日) × 日額 × 延滞係数（Fine）
/// - 返却予定日以前に返却：請求なし
pub fn calculate_charge(
    borrow_date: NaiveDate,
    expected_return_date: NaiveDate,
    actual_return_date: Option<NaiveDate>,
    daily_fee: DailyFee,
) -> Charge {
    match actual_return_date {
        None => {
            let days = (expected_return_date - borrow_date).num_days().max(1);
            Charge::Payment(Decimal::from(days) * daily_fee.value())
        }
        Some(returned) if returned > expected_return_date => {
            let overdue_days = (returned - expected_return_date).num_days();
            Charge::Fine(
                Decimal::from(overdue_days)
                    * daily_fee.value()
                    * Decimal::from(OVERDUE_COEFFICIENT),
            )
        }
        Some(_) => Charge::NoCharge,
    }
}
