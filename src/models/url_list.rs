use std::sync::LazyLock;

use regex::Regex;

static URL_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\n,]+").expect("分隔符正则是常量"));

/// 解析批量提交的 URL 文本
///
/// 按换行和/或逗号拆分，去除首尾空白并丢弃空项。保留原始顺序与重复项。
pub fn parse_url_list(raw: &str) -> Vec<String> {
    URL_SEPARATORS
        .split(raw)
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .collect()
}
