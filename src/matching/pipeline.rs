use tracing::debug;

use crate::KeywordRecord;

use super::scoring::{SuitabilityEngine, SuitabilityResult};

/// 랭킹 대상 공고(공고 id + 공고에 붙은 키워드 레코드)
#[derive(Debug, Clone)]
pub struct PostingKeywords {
    pub posting_id: i64,
    pub keywords: Vec<KeywordRecord>,
}

/// 랭킹 설정
#[derive(Debug, Clone)]
pub struct RankingConfig {
    /// 반환할 공고의 최대 수(점수 내림차순으로 절단)
    pub max_results: usize,
    /// 통과시킬 최소 점수. 미만은 제외.
    pub min_score: u32,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            max_results: 200,
            min_score: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RankedPosting {
    pub posting_id: i64,
    pub result: SuitabilityResult,
}

impl SuitabilityEngine {
    /// 공고들을 각각 독립적으로 평가해 점수 내림차순으로 돌려준다.
    /// 동점은 입력 순서를 유지한다(안정 정렬).
    pub fn rank_postings(
        &self,
        user_keyword_ids: &[i64],
        postings: &[PostingKeywords],
        config: &RankingConfig,
    ) -> Vec<RankedPosting> {
        let mut ranked: Vec<RankedPosting> = postings
            .iter()
            .map(|posting| RankedPosting {
                posting_id: posting.posting_id,
                result: self.evaluate(user_keyword_ids, &posting.keywords),
            })
            .filter(|ranked| ranked.result.score >= config.min_score)
            .collect();

        ranked.sort_by(|a, b| b.result.score.cmp(&a.result.score));
        ranked.truncate(config.max_results);

        debug!(
            evaluated = postings.len(),
            returned = ranked.len(),
            min_score = config.min_score,
            "ranked postings"
        );

        ranked
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::matching::rules::RuleConfig;
    use crate::{KeywordCatalog, KeywordCategory};

    fn catalog() -> KeywordCatalog {
        KeywordCatalog::from_records([
            KeywordRecord::new(1, "서울", KeywordCategory::Location),
            KeywordRecord::new(2, "부산", KeywordCategory::Location),
            KeywordRecord::new(20, "서비스", KeywordCategory::JobType),
            KeywordRecord::new(21, "제조", KeywordCategory::JobType),
            KeywordRecord::new(30, "월", KeywordCategory::WorkDay),
            KeywordRecord::new(31, "화", KeywordCategory::WorkDay),
        ])
        .expect("unique ids")
    }

    fn engine() -> SuitabilityEngine {
        SuitabilityEngine::new(Arc::new(catalog()), RuleConfig::default())
    }

    fn posting(posting_id: i64, ids: &[i64]) -> PostingKeywords {
        let catalog = catalog();
        PostingKeywords {
            posting_id,
            keywords: ids
                .iter()
                .map(|id| catalog.get(*id).expect("seeded id").clone())
                .collect(),
        }
    }

    #[test]
    fn ranks_postings_by_score_descending() {
        let engine = engine();
        let postings = [
            posting(100, &[2, 21]), // 지역/직종 모두 불일치
            posting(200, &[1, 20]), // 모두 일치
            posting(300, &[1, 21]), // 지역만 일치
        ];

        let ranked = engine.rank_postings(&[1, 20], &postings, &RankingConfig::default());

        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].posting_id, 200);
        assert_eq!(ranked[1].posting_id, 300);
        assert_eq!(ranked[2].posting_id, 100);
        assert!(ranked[0].result.score >= ranked[1].result.score);
    }

    #[test]
    fn min_score_filters_out_weak_matches() {
        let engine = engine();
        let postings = [posting(100, &[2, 21]), posting(200, &[1, 20])];

        let config = RankingConfig {
            min_score: 50,
            ..RankingConfig::default()
        };
        let ranked = engine.rank_postings(&[1, 20], &postings, &config);

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].posting_id, 200);
    }

    #[test]
    fn max_results_truncates_after_sorting() {
        let engine = engine();
        let postings = [
            posting(100, &[2, 21]),
            posting(200, &[1, 20]),
            posting(300, &[1, 21]),
        ];

        let config = RankingConfig {
            max_results: 1,
            ..RankingConfig::default()
        };
        let ranked = engine.rank_postings(&[1, 20], &postings, &config);

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].posting_id, 200);
    }

    #[test]
    fn equal_scores_keep_input_order() {
        let engine = engine();
        let postings = [posting(100, &[1, 20]), posting(200, &[1, 20])];

        let ranked = engine.rank_postings(&[1, 20], &postings, &RankingConfig::default());

        assert_eq!(ranked[0].result.score, ranked[1].result.score);
        assert_eq!(ranked[0].posting_id, 100);
        assert_eq!(ranked[1].posting_id, 200);
    }
}
