use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 書籍ID - カタログの集約ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookId(Uuid);

impl BookId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for BookId {
    fn default() -> Self {
        Self::new()
    }
}

/// 貸出ID - 貸出取引の集約ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BorrowingId(Uuid);

impl BorrowingId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for BorrowingId {
    fn default() -> Self {
        Self::new()
    }
}

/// 支払いID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaymentId(Uuid);

impl PaymentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for PaymentId {
    fn default() -> Self {
        Self::new()
    }
}

/// ユーザーID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

/// 操作を要求した利用者
///
/// 認可レイヤーから渡される「スタッフかどうか」の述語を保持する。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: UserId,
    pub is_staff: bool,
}

impl Caller {
    /// 指定ユーザーが所有するリソースにアクセスできるか
    pub fn can_access(&self, owner: UserId) -> bool {
        self.is_staff || self.user_id == owner
    }
}

/// 装丁
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CoverType {
    #[serde(rename = "HARD")]
    Hard,
    #[serde(rename = "SOFT")]
    #[default]
    Soft,
}

impl CoverType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoverType::Hard => "HARD",
            CoverType::Soft => "SOFT",
        }
    }
}

impl std::str::FromStr for CoverType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HARD" => Ok(CoverType::Hard),
            "SOFT" => Ok(CoverType::Soft),
            _ => Err(format!("Invalid cover type: {}", s)),
        }
    }
}

/// 日額料金のエラー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DailyFeeError {
    /// 0以下
    NotPositive,
    /// 小数点以下3桁以上
    TooPrecise,
    /// 上限（999.99）を超えている
    TooLarge,
}

/// 日額レンタル料金
///
/// 不変条件：
/// - 0より大きい
/// - 小数点以下は2桁まで
/// - 999.99以下（NUMERIC(5, 2)）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct DailyFee(Decimal);

impl DailyFee {
    /// 上限値
    pub const MAX: Decimal = Decimal::from_parts(99999, 0, 0, false, 2);

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for DailyFee {
    type Error = DailyFeeError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        if value <= Decimal::ZERO {
            return Err(DailyFeeError::NotPositive);
        }
        if value.normalize().scale() > 2 {
            return Err(DailyFeeError::TooPrecise);
        }
        if value > Self::MAX {
            return Err(DailyFeeError::TooLarge);
        }
        let mut value = value;
        value.rescale(2);
        Ok(Self(value))
    }
}

impl From<DailyFee> for Decimal {
    fn from(fee: DailyFee) -> Self {
        fee.0
    }
}

impl std::fmt::Display for DailyFeeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DailyFeeError::NotPositive => write!(f, "Daily fee must be greater than zero."),
            DailyFeeError::TooPrecise => {
                write!(f, "Daily fee must have at most 2 decimal places.")
            }
            DailyFeeError::TooLarge => write!(f, "Daily fee must not exceed 999.99."),
        }
    }
}

impl std::error::Error for DailyFeeError {}

/// メールアドレスのエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// 空文字
    Empty,
    /// `local@domain` の形式でない
    Malformed,
}

/// メールアドレス
///
/// ドメイン部分は小文字に正規化する。ローカル部分は保持する。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    pub fn parse(raw: &str) -> Result<Self, EmailError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(EmailError::Empty);
        }

        let (local, domain) = trimmed.rsplit_once('@').ok_or(EmailError::Malformed)?;
        if local.is_empty() || domain.is_empty() || domain.contains(char::is_whitespace) {
            return Err(EmailError::Malformed);
        }

        Ok(Self(format!("{}@{}", local, domain.to_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 一意性判定用のキー（大文字小文字を区別しない）
    pub fn canonical(&self) -> String {
        self.0.to_lowercase()
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
