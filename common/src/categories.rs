//! カテゴリ文字列の変換
//!
//! CSVではカテゴリのリストを `A|B|C` のように`|`区切りの1セルで保持する。
//! 空セル・欠損は「カテゴリなし」として扱う。

/// カテゴリ区切り文字
pub const DELIMITER: char = '|';

/// `|`区切り文字列をカテゴリのリストに分解
///
/// 欠損・空文字は空リスト。各要素の前後の空白は除去する。
pub fn parse(raw: Option<&str>) -> Vec<String> {
    match raw {
        Some(s) if !s.trim().is_empty() => s
            .split(DELIMITER)
            .map(|c| c.trim().to_string())
            .collect(),
        _ => Vec::new(),
    }
}

/// カテゴリのリストを`|`区切りで連結（トリムは呼び出し側の責務）
pub fn serialize<S: AsRef<str>>(labels: &[S]) -> String {
    labels
        .iter()
        .map(|l| l.as_ref())
        .collect::<Vec<_>>()
        .join(&DELIMITER.to_string())
}

/// モデルが選び、採点者が選ばなかったカテゴリ（モデル側の順序を保持）
pub fn missing_from<S: AsRef<str>>(model: &[String], grader: &[S]) -> Vec<String> {
    model
        .iter()
        .filter(|m| !grader.iter().any(|g| g.as_ref() == m.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_empty_and_absent() {
        assert!(parse(None).is_empty());
        assert!(parse(Some("")).is_empty());
        assert!(parse(Some("   ")).is_empty());
    }

    #[test]
    fn test_parse_trims_labels() {
        assert_eq!(parse(Some(" A | B|C ")), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_parse_keeps_order_and_duplicates() {
        assert_eq!(parse(Some("b|a|b")), vec!["b", "a", "b"]);
    }

    #[test]
    fn test_serialize_joins_without_trimming() {
        assert_eq!(serialize(&["a", "b", "c"]), "a|b|c");
        assert_eq!(serialize(&[" a "]), " a ");
        assert_eq!(serialize::<&str>(&[]), "");
    }

    #[test]
    fn test_roundtrip_abc() {
        let labels = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(parse(Some(&serialize(&labels))), labels);
    }

    #[test]
    fn test_missing_from_preserves_model_order() {
        let model = parse(Some("C|A|B"));
        assert_eq!(missing_from(&model, &["A"]), vec!["C", "B"]);
        assert!(missing_from(&model, &["A", "B", "C", "D"]).is_empty());
    }

    proptest! {
        #[test]
        fn prop_parse_is_idempotent(raw in "[a-zA-Z0-9 |]{0,40}") {
            let once = parse(Some(&raw));
            let twice = parse(Some(&serialize(&once)));
            prop_assert_eq!(twice, once);
        }
    }
}
