//! 文件名工具
//!
//! 所有进入文件系统路径的标签都必须先经过 [`sanitize`]。

use std::sync::LazyLock;

use regex::Regex;

/// 净化后标签的最大长度
pub const MAX_LABEL_LEN: usize = 40;

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9]").expect("字符集正则是常量"));

/// 把任意标签转换为只含 `[A-Za-z0-9_]` 的字符串，并截断到 [`MAX_LABEL_LEN`]
///
/// 空标签返回 `"job"`，保证结果总能作为路径片段使用。
pub fn sanitize(label: &str) -> String {
    let cleaned = UNSAFE_CHARS.replace_all(label, "_");
    let truncated: String = cleaned.chars().take(MAX_LABEL_LEN).collect();
    if truncated.is_empty() {
        "job".to_string()
    } else {
        truncated
    }
}

/// 生成不会与其他任务冲突的名称：`<标签>_<毫秒时间戳>_<随机后缀>`
pub fn unique_name(label: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_{}_{}", sanitize(label), millis, &suffix[..8])
}

/// 带时间戳的下载文件名，如 `bulkpdf_1700000000000.zip`
pub fn download_name(prefix: &str, extension: &str) -> String {
    format!(
        "{}_{}.{}",
        sanitize(prefix),
        chrono::Utc::now().timestamp_millis(),
        extension
    )
}

/// 批量任务中第 `position` 个页面的文件名（从 1 开始）
pub fn page_file_name(position: usize) -> String {
    format!("page_{position:03}.pdf")
}

/// 失败标记文件名，与页面文件并列
pub fn failure_marker_name(position: usize) -> String {
    format!("fail_{}.txt", page_file_name(position))
}
