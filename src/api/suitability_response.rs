use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::matching::rules::SuitabilityLevel;
use crate::matching::scoring::{CategoryScore, SuitabilityResult};

/// 클라이언트 전송용 적합도 응답
///
/// 엔진 결과를 그대로 직렬화 가능한 형태로 옮긴 것. 필드 누락 없이
/// 점수/등급/카테고리 내역/일치 라벨/미충족 필수 카테고리를 전부 싣는다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuitabilityResponse {
    /// 공고 ID
    pub posting_id: i64,
    /// 최종 점수(하한 0, 상한 클램프 없음)
    pub score: u32,
    /// 적합도 등급
    pub level: SuitabilityLevel,
    /// 카테고리별 내역
    pub category_scores: BTreeMap<String, CategoryScoreDto>,
    /// 카테고리별 일치 키워드 라벨(설명 UI 용)
    pub matched_keywords: BTreeMap<String, Vec<String>>,
    /// 게이트가 깨진 필수 카테고리
    pub missing_required_categories: Vec<String>,

    // === 메타데이터 ===
    pub engine_version: String,
    pub rule_version: String,
    pub evaluated_at: DateTime<Utc>,
}

/// 카테고리 내역 DTO
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScoreDto {
    pub matched: usize,
    pub total: usize,
    pub score: f64,
    pub weight: f64,
}

impl From<&CategoryScore> for CategoryScoreDto {
    fn from(value: &CategoryScore) -> Self {
        Self {
            matched: value.matched,
            total: value.total,
            score: value.score,
            weight: value.weight,
        }
    }
}

impl SuitabilityResponse {
    /// 엔진 결과로부터 응답을 조립한다. 타임스탬프/버전은 호출 측이 준다.
    pub fn from_result(
        posting_id: i64,
        result: &SuitabilityResult,
        evaluated_at: DateTime<Utc>,
        engine_version: impl Into<String>,
        rule_version: impl Into<String>,
    ) -> Self {
        Self {
            posting_id,
            score: result.score,
            level: result.level,
            category_scores: result
                .details
                .category_scores
                .iter()
                .map(|(name, score)| (name.to_string(), CategoryScoreDto::from(score)))
                .collect(),
            matched_keywords: result
                .details
                .matched_keyword_labels
                .iter()
                .map(|(name, labels)| (name.to_string(), labels.clone()))
                .collect(),
            missing_required_categories: result
                .details
                .missing_required_categories
                .iter()
                .map(|name| name.to_string())
                .collect(),
            engine_version: engine_version.into(),
            rule_version: rule_version.into(),
            evaluated_at,
        }
    }

    /// 설명 화면용 한 줄 요약 목록
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .matched_keywords
            .iter()
            .map(|(category, labels)| format!("{}: {}", category, labels.join(", ")))
            .collect();

        for category in &self.missing_required_categories {
            lines.push(format!("{}: 필수 조건 불일치", category));
        }

        lines
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::matching::rules::RuleConfig;
    use crate::matching::scoring::SuitabilityEngine;
    use crate::{KeywordCatalog, KeywordCategory, KeywordRecord, ENGINE_VERSION};

    fn sample_result() -> SuitabilityResult {
        let catalog = KeywordCatalog::from_records([
            KeywordRecord::new(1, "서울", KeywordCategory::Location),
            KeywordRecord::new(20, "서비스", KeywordCategory::JobType),
        ])
        .expect("unique ids");
        let posting: Vec<KeywordRecord> = [1, 20]
            .iter()
            .map(|id| catalog.get(*id).expect("seeded id").clone())
            .collect();

        let engine = SuitabilityEngine::new(Arc::new(catalog), RuleConfig::default());
        engine.evaluate(&[1, 20], &posting)
    }

    #[test]
    fn builds_response_from_engine_result() {
        let result = sample_result();
        let evaluated_at = Utc::now();
        let response =
            SuitabilityResponse::from_result(77, &result, evaluated_at, ENGINE_VERSION, "rules-v1");

        assert_eq!(response.posting_id, 77);
        assert_eq!(response.score, result.score);
        assert_eq!(response.level, result.level);
        assert_eq!(response.evaluated_at, evaluated_at);
        assert_eq!(response.rule_version, "rules-v1");
        assert_eq!(response.category_scores.len(), 12);
        assert_eq!(
            response.matched_keywords.get("location"),
            Some(&vec!["서울".to_string()])
        );
        assert!(response.missing_required_categories.is_empty());
    }

    #[test]
    fn serializes_every_result_field() {
        let result = sample_result();
        let response = SuitabilityResponse::from_result(
            1,
            &result,
            Utc::now(),
            ENGINE_VERSION,
            "rules-v1",
        );

        let json = serde_json::to_value(&response).expect("serialize");
        assert!(json["score"].is_number());
        assert!(json["level"].is_string());
        assert!(json["category_scores"]["location"]["weight"].is_number());
        assert!(json["matched_keywords"]["job_type"].is_array());
        assert!(json["missing_required_categories"].is_array());
        assert!(json["evaluated_at"].is_string());

        let parsed: SuitabilityResponse = serde_json::from_value(json).expect("deserialize");
        assert_eq!(parsed.score, response.score);
        assert_eq!(parsed.category_scores, response.category_scores);
    }

    #[test]
    fn summary_lines_cover_matches_and_missing_gates() {
        let result = sample_result();
        let mut response = SuitabilityResponse::from_result(
            1,
            &result,
            Utc::now(),
            ENGINE_VERSION,
            "rules-v1",
        );
        response
            .missing_required_categories
            .push("gender".to_string());

        let lines = response.summary_lines();
        assert!(lines.iter().any(|line| line.contains("location: 서울")));
        assert!(lines
            .iter()
            .any(|line| line.contains("gender: 필수 조건 불일치")));
    }
}
