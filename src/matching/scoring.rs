use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::corrections::{age_range, korean_level};
use crate::{KeywordCatalog, KeywordCategory, KeywordRecord};

use super::rules::{RuleConfig, SuitabilityLevel};
use super::weights::{
    ConditionIdTable, CATEGORY_WEIGHTS, GENDER_GATE_PENALTY, LOCATION_GATE_MULTIPLIER,
};

/// 카테고리별 집계 내역
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryScore {
    /// 일치한 공고 키워드 수
    pub matched: usize,
    /// 공고가 해당 카테고리에 건 키워드 수
    pub total: usize,
    /// 획득 점수
    pub score: f64,
    /// 카테고리 배점
    pub weight: f64,
}

/// 평가 상세. 결과 설명 화면이 그대로 소비한다.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SuitabilityDetails {
    /// 평가 순서 그대로의 (카테고리, 내역) 목록
    pub category_scores: Vec<(&'static str, CategoryScore)>,
    /// 일치한 키워드 라벨(일치가 있었던 카테고리만)
    pub matched_keyword_labels: Vec<(&'static str, Vec<String>)>,
    /// 게이트가 깨진 필수 카테고리("location" / "gender")
    pub missing_required_categories: Vec<&'static str>,
}

impl SuitabilityDetails {
    pub fn category(&self, name: &str) -> Option<&CategoryScore> {
        self.category_scores
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, score)| score)
    }

    pub fn labels(&self, name: &str) -> Option<&[String]> {
        self.matched_keyword_labels
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, labels)| labels.as_slice())
    }

    fn record(&mut self, name: &'static str, outcome: &CategoryOutcome) {
        if !outcome.labels.is_empty() {
            self.matched_keyword_labels
                .push((name, outcome.labels.clone()));
        }
        self.category_scores.push((
            name,
            CategoryScore {
                matched: outcome.matched,
                total: outcome.total,
                score: outcome.points,
                weight: outcome.weight,
            },
        ));
    }
}

/// 한 번의 평가 결과. 호출 간 공유 상태가 없으며 엔진이 보관하지 않는다.
#[derive(Debug, Clone, PartialEq)]
pub struct SuitabilityResult {
    /// 최종 점수. 하한 0, 상한 클램프 없음(배점 합이 100을 넘는다)
    pub score: u32,
    pub level: SuitabilityLevel,
    pub details: SuitabilityDetails,
}

/// 카테고리 단위 평가 결과(집계 내부용)
struct CategoryOutcome {
    matched: usize,
    total: usize,
    points: f64,
    weight: f64,
    labels: Vec<String>,
    satisfied: bool,
}

impl CategoryOutcome {
    fn no_match(total: usize, weight: f64) -> Self {
        Self {
            matched: 0,
            total,
            points: 0.0,
            weight,
            labels: Vec::new(),
            satisfied: false,
        }
    }

    fn full(matched: usize, total: usize, weight: f64, labels: Vec<String>) -> Self {
        Self {
            matched,
            total,
            points: weight,
            weight,
            labels,
            satisfied: true,
        }
    }
}

/// 공고가 해당 카테고리에 키워드를 걸지 않았을 때의 처리
#[derive(Clone, Copy)]
enum EmptyPolicy {
    /// 요구 없음 = 충족(만점)
    FullCredit,
    /// 요구 없음 = 가점 없음
    NoCredit,
}

/// 적합도 스코어링 엔진
///
/// 카탈로그/조건 id 테이블은 생성 시점에 고정되고, 규칙만 replace_rules 로
/// 원자적으로 교체된다. 평가 함수는 순수하므로 하나의 인스턴스를
/// 임의 개수의 호출자가 동기화 없이 공유해도 된다.
pub struct SuitabilityEngine {
    catalog: Arc<KeywordCatalog>,
    condition_ids: ConditionIdTable,
    rules: RwLock<Arc<RuleConfig>>,
}

impl SuitabilityEngine {
    pub fn new(catalog: Arc<KeywordCatalog>, rules: RuleConfig) -> Self {
        Self::with_condition_ids(catalog, rules, ConditionIdTable::default())
    }

    pub fn with_condition_ids(
        catalog: Arc<KeywordCatalog>,
        rules: RuleConfig,
        condition_ids: ConditionIdTable,
    ) -> Self {
        Self {
            catalog,
            condition_ids,
            rules: RwLock::new(Arc::new(rules)),
        }
    }

    pub fn catalog(&self) -> &KeywordCatalog {
        &self.catalog
    }

    /// 규칙 전체 교체(부분 병합 없음).
    /// 진행 중인 평가는 이전/새 규칙 중 하나를 보며, 평가가 호출 하나를
    /// 넘지 않으므로 허용되는 경합이다.
    pub fn replace_rules(&self, rules: RuleConfig) {
        let next = Arc::new(rules);
        match self.rules.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }

    pub fn current_rules(&self) -> Arc<RuleConfig> {
        match self.rules.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// 구직자 선택 키워드와 공고 키워드로 적합도를 계산한다.
    ///
    /// 전 입력 구간에서 완전한 함수다. 빈 입력, 미등록 id, 중복 카테고리
    /// 모두 예외 없이 유효한 결과로 떨어진다.
    pub fn evaluate(
        &self,
        user_keyword_ids: &[i64],
        posting_keywords: &[KeywordRecord],
    ) -> SuitabilityResult {
        let rules = self.current_rules();
        let ctx = EvaluationContext::new(&self.catalog, user_keyword_ids, posting_keywords);
        let weights = CATEGORY_WEIGHTS;

        let mut details = SuitabilityDetails::default();
        let mut total = 0.0;

        // 1. 지역(게이트 대상): 와일드카드 없음. 공고에 지역 키워드가 없으면 일치로 본다.
        let location = ctx.match_binary(
            KeywordCategory::Location,
            weights.location,
            false,
            EmptyPolicy::FullCredit,
        );
        let location_matched = location.satisfied;
        total += location.points;
        details.record("location", &location);

        // 2. 성별 게이트(배점 0): 일치 여부만 마지막 감점 단계에서 쓴다.
        let gender_gate =
            ctx.match_binary(KeywordCategory::Gender, 0.0, true, EmptyPolicy::FullCredit);
        let gender_matched = gender_gate.satisfied;
        details.record("gender_required", &gender_gate);

        // 3. 직종: 요구가 없으면 만점, 있으면 하나라도 겹치면 만점(겹친 수에 비례하지 않음)
        let job_type = ctx.match_binary(
            KeywordCategory::JobType,
            weights.job_type,
            false,
            EmptyPolicy::FullCredit,
        );
        total += job_type.points;
        details.record("job_type", &job_type);

        // 4. 근무 요일: 요구 요일 대비 일치 비율로 배점(요구가 없으면 직종과 달리 0)
        let work_day = ctx.score_work_day(weights.work_day);
        total += work_day.points;
        details.record("work_day", &work_day);

        // 5. 한국어 수준: 공고 요구 최소 수준 이상이면 만점
        let korean = ctx.score_korean_level(weights.korean_level);
        total += korean.points;
        details.record("korean_level", &korean);

        // 6. 비자
        let visa = ctx.match_binary(
            KeywordCategory::Visa,
            weights.visa,
            true,
            EmptyPolicy::NoCredit,
        );
        total += visa.points;
        details.record("visa", &visa);

        // 7. 성별(배점 4): 2단계 게이트와 같은 판정의 재평가
        let gender = ctx.match_binary(
            KeywordCategory::Gender,
            weights.gender,
            true,
            EmptyPolicy::FullCredit,
        );
        total += gender.points;
        details.record("gender", &gender);

        // 8. 연령대: 정확 일치 만점, 인접 구간은 절반
        let age = ctx.score_age_range(weights.age_range);
        total += age.points;
        details.record("age_range", &age);

        // 9. 고정 조건 id(비자 지원/식사 제공), 기타 세부 조건, 국가
        let visa_support =
            ctx.score_fixed_condition(self.condition_ids.visa_support, weights.visa_support);
        total += visa_support.points;
        details.record("visa_support", &visa_support);

        let meal = ctx.score_fixed_condition(self.condition_ids.meal_provided, weights.meal_provided);
        total += meal.points;
        details.record("meal_provided", &meal);

        let other =
            ctx.score_other_conditions(&self.condition_ids.other_conditions, weights.other_conditions);
        total += other.points;
        details.record("other_conditions", &other);

        let country = ctx.match_binary(
            KeywordCategory::Country,
            weights.country,
            true,
            EmptyPolicy::NoCredit,
        );
        total += country.points;
        details.record("country", &country);

        // 10. 지역 게이트: 미일치면 무관한 카테고리 점수까지 포함해 70% 를 잃는다
        if !location_matched {
            total *= LOCATION_GATE_MULTIPLIER;
            details.missing_required_categories.push("location");
        }

        // 11. 성별 게이트: 미일치면 20점 차감, 하한 0
        if !gender_matched {
            total = (total - GENDER_GATE_PENALTY).max(0.0);
            details.missing_required_categories.push("gender");
        }

        // 12. 반올림해 최종 점수 확정
        let score = total.max(0.0).round() as u32;
        let level = rules.score_levels.classify(score);

        SuitabilityResult {
            score,
            level,
            details,
        }
    }
}

/// 한 번의 평가에서만 쓰는 조회 구조.
/// 구직자 id 는 카탈로그로 해석하므로 공고에 없는 키워드(예: 다른 연령대,
/// 더 높은 한국어 수준)도 판정에 쓸 수 있다.
struct EvaluationContext<'a> {
    user_ids: HashSet<i64>,
    user_by_category: HashMap<KeywordCategory, Vec<&'a KeywordRecord>>,
    posting_by_category: HashMap<KeywordCategory, Vec<&'a KeywordRecord>>,
    posting_index: HashMap<i64, &'a KeywordRecord>,
}

impl<'a> EvaluationContext<'a> {
    fn new(
        catalog: &'a KeywordCatalog,
        user_keyword_ids: &[i64],
        posting_keywords: &'a [KeywordRecord],
    ) -> Self {
        let user_ids: HashSet<i64> = user_keyword_ids.iter().copied().collect();

        let mut user_by_category: HashMap<KeywordCategory, Vec<&'a KeywordRecord>> = HashMap::new();
        for record in catalog.resolve(user_keyword_ids) {
            user_by_category.entry(record.category).or_default().push(record);
        }

        let mut posting_by_category: HashMap<KeywordCategory, Vec<&'a KeywordRecord>> =
            HashMap::new();
        let mut posting_index = HashMap::new();
        for record in posting_keywords {
            posting_by_category
                .entry(record.category)
                .or_default()
                .push(record);
            posting_index.insert(record.id, record);
        }

        Self {
            user_ids,
            user_by_category,
            posting_by_category,
            posting_index,
        }
    }

    fn selected(&self, id: i64) -> bool {
        self.user_ids.contains(&id)
    }

    fn posting_in(&self, category: KeywordCategory) -> &[&'a KeywordRecord] {
        self.posting_by_category
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn user_in(&self, category: KeywordCategory) -> &[&'a KeywordRecord] {
        self.user_by_category
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// 와일드카드 성립 여부. 공고가 해당 카테고리에 '상관없음'을 걸었거나
    /// 구직자가 그 카테고리의 '상관없음' 키워드를 선택한 경우 라벨을 돌려준다.
    fn wildcard(&self, category: KeywordCategory) -> Option<String> {
        self.posting_in(category)
            .iter()
            .find(|record| record.is_wildcard())
            .or_else(|| {
                self.user_in(category)
                    .iter()
                    .find(|record| record.is_wildcard())
            })
            .map(|record| record.label.clone())
    }

    /// 공고 카테고리 소속 여부의 이진 판정.
    /// 성별이 게이트(배점 0)와 본 배점(4)으로 두 번 평가되는 것을 포함해
    /// 지역/직종/비자/국가가 전부 이 판정 하나를 공유한다.
    fn match_binary(
        &self,
        category: KeywordCategory,
        weight: f64,
        use_wildcard: bool,
        empty: EmptyPolicy,
    ) -> CategoryOutcome {
        let posting = self.posting_in(category);
        let total = posting.len();

        if use_wildcard {
            if let Some(label) = self.wildcard(category) {
                return CategoryOutcome::full(1, total, weight, vec![label]);
            }
        }

        if total == 0 {
            return match empty {
                EmptyPolicy::FullCredit => CategoryOutcome::full(0, 0, weight, Vec::new()),
                EmptyPolicy::NoCredit => CategoryOutcome::no_match(0, weight),
            };
        }

        let matched: Vec<String> = posting
            .iter()
            .filter(|record| self.selected(record.id))
            .map(|record| record.label.clone())
            .collect();

        if matched.is_empty() {
            CategoryOutcome::no_match(total, weight)
        } else {
            CategoryOutcome::full(matched.len(), total, weight, matched)
        }
    }

    fn score_work_day(&self, weight: f64) -> CategoryOutcome {
        let posting = self.posting_in(KeywordCategory::WorkDay);
        let total = posting.len();
        if total == 0 {
            return CategoryOutcome::no_match(0, weight);
        }

        let matched: Vec<String> = posting
            .iter()
            .filter(|record| self.selected(record.id))
            .map(|record| record.label.clone())
            .collect();

        if matched.is_empty() {
            return CategoryOutcome::no_match(total, weight);
        }

        let points = matched.len() as f64 / total as f64 * weight;
        CategoryOutcome {
            matched: matched.len(),
            total,
            points,
            weight,
            labels: matched,
            satisfied: true,
        }
    }

    fn score_korean_level(&self, weight: f64) -> CategoryOutcome {
        let posting = self.posting_in(KeywordCategory::KoreanLevel);
        let total = posting.len();

        if let Some(label) = self.wildcard(KeywordCategory::KoreanLevel) {
            return CategoryOutcome::full(1, total, weight, vec![label]);
        }

        // 공고가 수준을 요구하지 않으면 가점도 감점도 없다
        let required = posting
            .iter()
            .filter_map(|record| korean_level::korean_level_rank(&record.label))
            .min();
        let Some(required) = required else {
            return CategoryOutcome::no_match(total, weight);
        };

        // 구직자 보유 수준의 최댓값이 요구 최소 수준 이상이면 만점
        let best = self
            .user_in(KeywordCategory::KoreanLevel)
            .iter()
            .filter_map(|record| {
                korean_level::korean_level_rank(&record.label).map(|rank| (rank, &record.label))
            })
            .max_by_key(|(rank, _)| *rank);

        match best {
            Some((rank, label)) if rank >= required => {
                CategoryOutcome::full(1, total, weight, vec![label.clone()])
            }
            _ => CategoryOutcome::no_match(total, weight),
        }
    }

    fn score_age_range(&self, weight: f64) -> CategoryOutcome {
        let posting = self.posting_in(KeywordCategory::AgeRange);
        let total = posting.len();

        if let Some(label) = self.wildcard(KeywordCategory::AgeRange) {
            return CategoryOutcome::full(1, total, weight, vec![label]);
        }

        if total == 0 {
            return CategoryOutcome::no_match(0, weight);
        }

        let exact: Vec<String> = posting
            .iter()
            .filter(|record| self.selected(record.id))
            .map(|record| record.label.clone())
            .collect();
        if !exact.is_empty() {
            return CategoryOutcome::full(exact.len(), total, weight, exact);
        }

        // 인접 구간은 절반 점수
        let accepted: Vec<usize> = posting
            .iter()
            .filter_map(|record| age_range::age_bracket_index(&record.label))
            .collect();
        let adjacent = self
            .user_in(KeywordCategory::AgeRange)
            .iter()
            .filter_map(|record| {
                age_range::age_bracket_index(&record.label).map(|index| (index, &record.label))
            })
            .find(|(index, _)| {
                accepted
                    .iter()
                    .any(|a| age_range::is_adjacent_bracket(*index, *a))
            });

        match adjacent {
            Some((_, label)) => CategoryOutcome {
                matched: 0,
                total,
                points: weight * 0.5,
                weight,
                labels: vec![label.clone()],
                satisfied: true,
            },
            None => CategoryOutcome::no_match(total, weight),
        }
    }

    /// 특정 카탈로그 id 에 걸린 단일 조건(비자 지원, 식사 제공).
    /// 공고가 조건을 걸지 않았으면 가점 없음.
    fn score_fixed_condition(&self, keyword_id: i64, weight: f64) -> CategoryOutcome {
        let Some(record) = self.posting_index.get(&keyword_id) else {
            return CategoryOutcome::no_match(0, weight);
        };

        if self.selected(keyword_id) {
            CategoryOutcome::full(1, 1, weight, vec![record.label.clone()])
        } else {
            CategoryOutcome::no_match(1, weight)
        }
    }

    /// 기타 세부 조건 4종. 공고가 하나도 걸지 않았으면 기본 만점,
    /// 걸었으면 일치 비율로 배점한다.
    fn score_other_conditions(&self, condition_ids: &[i64; 4], weight: f64) -> CategoryOutcome {
        let required: Vec<&&KeywordRecord> = condition_ids
            .iter()
            .filter_map(|id| self.posting_index.get(id))
            .collect();
        let total = required.len();
        if total == 0 {
            return CategoryOutcome::full(0, 0, weight, Vec::new());
        }

        let matched: Vec<String> = required
            .iter()
            .filter(|record| self.selected(record.id))
            .map(|record| record.label.clone())
            .collect();

        let points = matched.len() as f64 / total as f64 * weight;
        CategoryOutcome {
            matched: matched.len(),
            total,
            points,
            weight,
            labels: matched,
            satisfied: points > 0.0,
        }
    }
}
