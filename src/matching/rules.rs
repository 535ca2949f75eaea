use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 적합도 등급
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuitabilityLevel {
    Perfect,
    Excellent,
    Good,
    Fair,
    Low,
}

impl SuitabilityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuitabilityLevel::Perfect => "perfect",
            SuitabilityLevel::Excellent => "excellent",
            SuitabilityLevel::Good => "good",
            SuitabilityLevel::Fair => "fair",
            SuitabilityLevel::Low => "low",
        }
    }
}

/// 등급 임계값. 설정 중 집계가 실제로 읽는 유일한 필드.
///
/// perfect ≥ excellent ≥ good ≥ fair 가 전제지만 검증하지 않는다.
/// 어긋난 값은 그대로 받아들여 등급 경계만 이상해진다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreLevels {
    pub perfect: u32,
    pub excellent: u32,
    pub good: u32,
    pub fair: u32,
}

impl Default for ScoreLevels {
    fn default() -> Self {
        Self {
            perfect: 90,
            excellent: 75,
            good: 60,
            fair: 40,
        }
    }
}

impl ScoreLevels {
    pub fn classify(&self, score: u32) -> SuitabilityLevel {
        if score >= self.perfect {
            SuitabilityLevel::Perfect
        } else if score >= self.excellent {
            SuitabilityLevel::Excellent
        } else if score >= self.good {
            SuitabilityLevel::Good
        } else if score >= self.fair {
            SuitabilityLevel::Fair
        } else {
            SuitabilityLevel::Low
        }
    }

    /// 환경 변수에서 임계값을 읽는다(JF_SCORE_LEVEL_*, 없으면 기본값)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            perfect: env_threshold("JF_SCORE_LEVEL_PERFECT", defaults.perfect),
            excellent: env_threshold("JF_SCORE_LEVEL_EXCELLENT", defaults.excellent),
            good: env_threshold("JF_SCORE_LEVEL_GOOD", defaults.good),
            fair: env_threshold("JF_SCORE_LEVEL_FAIR", defaults.fair),
        }
    }
}

fn env_threshold(name: &str, default: u32) -> u32 {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// 키워드 조합 보너스 규칙
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinationBonus {
    pub id: i64,
    pub name: String,
    pub keyword_ids: Vec<i64>,
    pub require_all: bool,
    pub bonus: f64,
}

#[derive(Debug, Error)]
pub enum RuleConfigError {
    #[error("rule config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// 스코어링 규칙 설정. 교체는 엔진의 replace_rules 로 통째로 이루어진다(부분 병합 없음).
///
/// score_levels 외의 필드는 운영 도구에서 선언/배포되지만 집계 단계에는
/// 아직 반영되지 않는다. 배점은 weights.rs 의 고정 테이블이,
/// 필수 판정(지역/성별)은 집계 로직이 직접 들고 있다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// 카테고리 가중치 선언(합 100 기준). 집계 미반영.
    #[serde(default)]
    pub category_weights: BTreeMap<String, f64>,
    /// 키워드별 고정 보너스 선언. 집계 미반영.
    #[serde(default)]
    pub keyword_bonus: BTreeMap<i64, f64>,
    /// 조합 보너스 선언. 집계 미반영.
    #[serde(default)]
    pub combination_bonuses: Vec<CombinationBonus>,
    /// 카테고리별 필수 키워드 선언. 집계 미반영.
    #[serde(default)]
    pub required_keywords: BTreeMap<String, Vec<i64>>,
    pub score_levels: ScoreLevels,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            category_weights: BTreeMap::new(),
            keyword_bonus: BTreeMap::new(),
            combination_bonuses: Vec::new(),
            required_keywords: BTreeMap::new(),
            score_levels: ScoreLevels::default(),
        }
    }
}

impl RuleConfig {
    /// 운영 도구가 배포하는 JSON 규칙 문서를 파싱한다.
    /// 문법 오류만 실패로 본다. 값 검증은 하지 않는다.
    pub fn from_json_str(raw: &str) -> Result<Self, RuleConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_env() -> Self {
        Self {
            score_levels: ScoreLevels::from_env(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_scores_into_levels() {
        let levels = ScoreLevels::default();

        assert_eq!(levels.classify(107), SuitabilityLevel::Perfect);
        assert_eq!(levels.classify(90), SuitabilityLevel::Perfect);
        assert_eq!(levels.classify(89), SuitabilityLevel::Excellent);
        assert_eq!(levels.classify(75), SuitabilityLevel::Excellent);
        assert_eq!(levels.classify(74), SuitabilityLevel::Good);
        assert_eq!(levels.classify(60), SuitabilityLevel::Good);
        assert_eq!(levels.classify(59), SuitabilityLevel::Fair);
        assert_eq!(levels.classify(40), SuitabilityLevel::Fair);
        assert_eq!(levels.classify(39), SuitabilityLevel::Low);
        assert_eq!(levels.classify(0), SuitabilityLevel::Low);
    }

    #[test]
    fn unordered_thresholds_are_accepted_as_is() {
        // 검증하지 않으므로 뒤집힌 임계값도 그대로 동작한다.
        let levels = ScoreLevels {
            perfect: 10,
            excellent: 75,
            good: 60,
            fair: 40,
        };

        assert_eq!(levels.classify(20), SuitabilityLevel::Perfect);
    }

    #[test]
    fn parses_full_rule_document() {
        let raw = r#"{
            "category_weights": {"location": 38.0, "job_type": 33.0},
            "keyword_bonus": {"20": 1.5},
            "combination_bonuses": [
                {"id": 1, "name": "기숙사+이주", "keyword_ids": [153, 80], "require_all": true, "bonus": 3.0}
            ],
            "required_keywords": {"location": [1, 2]},
            "score_levels": {"perfect": 90, "excellent": 75, "good": 60, "fair": 40}
        }"#;

        let config = RuleConfig::from_json_str(raw).expect("valid document");
        assert_eq!(config.category_weights.get("location"), Some(&38.0));
        assert_eq!(config.keyword_bonus.get(&20), Some(&1.5));
        assert_eq!(config.combination_bonuses.len(), 1);
        assert!(config.combination_bonuses[0].require_all);
        assert_eq!(config.required_keywords.get("location"), Some(&vec![1, 2]));
        assert_eq!(config.score_levels, ScoreLevels::default());
    }

    #[test]
    fn declared_only_fields_may_be_omitted() {
        let raw = r#"{"score_levels": {"perfect": 95, "excellent": 80, "good": 65, "fair": 45}}"#;

        let config = RuleConfig::from_json_str(raw).expect("valid document");
        assert!(config.category_weights.is_empty());
        assert!(config.combination_bonuses.is_empty());
        assert_eq!(config.score_levels.perfect, 95);
    }

    #[test]
    fn rejects_malformed_json() {
        let result = RuleConfig::from_json_str("{score_levels:}");
        assert!(matches!(result, Err(RuleConfigError::Parse(_))));
    }

    #[test]
    fn level_names_are_stable() {
        assert_eq!(SuitabilityLevel::Perfect.as_str(), "perfect");
        let json = serde_json::to_string(&SuitabilityLevel::Low).expect("serialize");
        assert_eq!(json, "\"low\"");
    }
}
