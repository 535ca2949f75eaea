pub mod api;
pub mod corrections;
pub mod logging;
pub mod matching;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use corrections::wildcard::is_no_preference_label;

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

// Commonly used reference-data models for the suitability engine.

/// 키워드 카탈로그의 속성 차원
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordCategory {
    Country,
    JobType,
    WorkCondition,
    Location,
    AgeRange,
    Gender,
    Visa,
    WorkDay,
    KoreanLevel,
    Relocatable,
}

impl KeywordCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeywordCategory::Country => "country",
            KeywordCategory::JobType => "job_type",
            KeywordCategory::WorkCondition => "work_condition",
            KeywordCategory::Location => "location",
            KeywordCategory::AgeRange => "age_range",
            KeywordCategory::Gender => "gender",
            KeywordCategory::Visa => "visa",
            KeywordCategory::WorkDay => "work_day",
            KeywordCategory::KoreanLevel => "korean_level",
            KeywordCategory::Relocatable => "relocatable",
        }
    }
}

/// 카탈로그 키워드 레코드. 백엔드가 생성/삭제하는 불변 참조 데이터이며
/// 엔진은 절대 변경하지 않는다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRecord {
    pub id: i64,
    pub label: String,
    pub category: KeywordCategory,
}

impl KeywordRecord {
    pub fn new(id: i64, label: impl Into<String>, category: KeywordCategory) -> Self {
        Self {
            id,
            label: label.into(),
            category,
        }
    }

    /// '상관없음' 계열 라벨인지
    pub fn is_wildcard(&self) -> bool {
        is_no_preference_label(&self.label)
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("duplicate keyword id in catalog: {0}")]
    DuplicateKeywordId(i64),
}

/// 키워드 카탈로그 스냅샷(id → 레코드)
///
/// 카탈로그 id 는 전역 고유라는 전제를 생성 시점에 확인한다.
/// 평가 중에는 조회만 하며 실패 경로가 없다.
#[derive(Debug, Clone, Default)]
pub struct KeywordCatalog {
    records: HashMap<i64, KeywordRecord>,
}

impl KeywordCatalog {
    pub fn from_records<I>(records: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = KeywordRecord>,
    {
        let mut map = HashMap::new();
        for record in records {
            let id = record.id;
            if map.insert(id, record).is_some() {
                return Err(CatalogError::DuplicateKeywordId(id));
            }
        }
        Ok(Self { records: map })
    }

    pub fn get(&self, id: i64) -> Option<&KeywordRecord> {
        self.records.get(&id)
    }

    /// 선택 id 목록을 레코드로 해석한다. 미등록 id 는 조용히 무시된다(입력 순서 유지).
    pub fn resolve(&self, ids: &[i64]) -> Vec<&KeywordRecord> {
        ids.iter().filter_map(|id| self.records.get(id)).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
