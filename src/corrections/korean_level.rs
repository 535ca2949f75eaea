pub const KOREAN_LEVEL_ENUMS: &[&str] = &["초급", "중급", "고급"];

/// 한국어 수준 라벨 정규화
pub fn correct_korean_level(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    if KOREAN_LEVEL_ENUMS.contains(&trimmed) {
        return Some(trimmed.to_string());
    }

    if trimmed.contains("고급") || trimmed.contains("능통") || trimmed.contains("유창") {
        return Some("고급".to_string());
    }
    if trimmed.contains("중급") || trimmed.contains("일상") {
        return Some("중급".to_string());
    }
    if trimmed.contains("초급") || trimmed.contains("기초") {
        return Some("초급".to_string());
    }

    None
}

/// 한국어 수준 라벨 → 서열(초급=1, 중급=2, 고급=3)
pub fn korean_level_rank(label: &str) -> Option<u8> {
    match correct_korean_level(label)?.as_str() {
        "초급" => Some(1),
        "중급" => Some(2),
        "고급" => Some(3),
        _ => None,
    }
}
