/// '상관없음' 센티널 라벨 판정
///
/// 카탈로그는 카테고리마다 "아무 값이나 허용"을 뜻하는 키워드를 하나씩 둔다.
/// 표기가 '상관없음'/'무관'으로 흔들리므로 둘 다 받는다.
pub fn is_no_preference_label(label: &str) -> bool {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return false;
    }

    trimmed.contains("상관없") || trimmed.contains("무관")
}
