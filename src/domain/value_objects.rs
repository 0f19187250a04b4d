use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 書籍ID - カタログ内で書籍を一意に識別する
///
/// UUID v4で生成するため、カタログの生存期間内での一意性が保証される。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
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

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for BookId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// 利用者ID - カタログ内で利用者を一意に識別する
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
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

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// 貸出期間エラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoanPeriodError {
    /// 0日の貸出期間は作成できない
    Zero,
}

/// 既定の貸出期間（日数）
pub const DEFAULT_LOAN_PERIOD_DAYS: u32 = 14;

/// 貸出期間（日数）
///
/// 不変条件：1日以上
/// 型システムでこの制約を強制し、不正な値（0日）を作成できないようにする。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanPeriod(u32);

impl LoanPeriod {
    /// 日数
    pub fn days(&self) -> u32 {
        self.0
    }
}

impl Default for LoanPeriod {
    /// 既定は14日間
    fn default() -> Self {
        Self(DEFAULT_LOAN_PERIOD_DAYS)
    }
}

impl TryFrom<u32> for LoanPeriod {
    type Error = LoanPeriodError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if value == 0 {
            return Err(LoanPeriodError::Zero);
        }
        Ok(Self(value))
    }
}
