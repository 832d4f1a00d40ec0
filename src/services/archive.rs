//! 压缩包组装服务 - 业务能力层
//!
//! 逐个追加文件并显式结束，只有在压缩包完整写入并关闭后才返回路径。

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{ArchiveError, JobError};

/// 压缩包中的一个成员
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// 成员名称，原样写入压缩包
    pub name: String,
    /// 源文件路径
    pub path: PathBuf,
}

impl ArchiveEntry {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// 增量写入的 ZIP 文件
///
/// 成员内容从源文件流式复制，不会整体读入内存。
pub struct ArchiveWriter {
    zip: ZipWriter<File>,
    path: PathBuf,
    entries: usize,
}

impl ArchiveWriter {
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, ArchiveError> {
        let path = path.into();
        let file = File::create(&path)?;
        Ok(Self {
            zip: ZipWriter::new(file),
            path,
            entries: 0,
        })
    }

    /// 追加一个成员
    pub fn append(&mut self, name: &str, source: &Path) -> Result<(), ArchiveError> {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(9));

        let mut input = File::open(source)?;
        self.zip.start_file(name, options)?;
        io::copy(&mut input, &mut self.zip)?;
        self.entries += 1;
        Ok(())
    }

    /// 写入中央目录并关闭文件
    pub fn finish(self) -> Result<PathBuf, ArchiveError> {
        let file = self.zip.finish()?;
        file.sync_all()?;
        debug!("压缩包已关闭: {} ({} 个成员)", self.path.display(), self.entries);
        Ok(self.path)
    }
}

/// 压缩包组装服务
#[derive(Debug, Clone)]
pub struct ArchiveAssembler {
    output_dir: PathBuf,
}

impl ArchiveAssembler {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// 把 `entries` 按顺序写入 `<output_dir>/<archive_name>`
    ///
    /// 空列表也会生成合法的空压缩包。失败时删除写了一半的文件。
    pub async fn assemble(
        &self,
        archive_name: &str,
        entries: Vec<ArchiveEntry>,
    ) -> Result<PathBuf, JobError> {
        let path = self.output_dir.join(archive_name);
        let count = entries.len();

        let target = path.clone();
        let result = tokio::task::spawn_blocking(move || write_archive(target, &entries))
            .await
            .unwrap_or_else(|e| Err(ArchiveError::Join(e.to_string())));

        match result {
            Ok(path) => {
                info!("🗜️ 已生成压缩包: {} ({} 个文件)", path.display(), count);
                Ok(path)
            }
            Err(source) => {
                if let Err(e) = tokio::fs::remove_file(&path).await {
                    if e.kind() != io::ErrorKind::NotFound {
                        warn!("删除不完整的压缩包 {} 失败: {}", path.display(), e);
                    }
                }
                Err(JobError::ArchiveFailure { path, source })
            }
        }
    }
}

fn write_archive(path: PathBuf, entries: &[ArchiveEntry]) -> Result<PathBuf, ArchiveError> {
    let mut writer = ArchiveWriter::create(path)?;
    for entry in entries {
        writer.append(&entry.name, &entry.path)?;
    }
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn read_names(path: &Path) -> Vec<String> {
        let archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
        archive.file_names().map(str::to_string).collect::<Vec<_>>()
    }

    #[tokio::test]
    async fn test_entries_keep_names_and_order() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let b = src.path().join("b.pdf");
        let a = src.path().join("a.pdf");
        std::fs::write(&b, b"second").unwrap();
        std::fs::write(&a, b"first").unwrap();

        let path = ArchiveAssembler::new(out.path())
            .assemble(
                "job.zip",
                vec![
                    ArchiveEntry::new("page_001.pdf", &a),
                    ArchiveEntry::new("page_002.pdf", &b),
                ],
            )
            .await
            .unwrap();

        let mut archive = ZipArchive::new(File::open(&path).unwrap()).unwrap();
        assert_eq!(archive.len(), 2);
        let mut first = String::new();
        archive
            .by_index(0)
            .unwrap()
            .read_to_string(&mut first)
            .unwrap();
        assert_eq!(archive.by_index(0).unwrap().name(), "page_001.pdf");
        assert_eq!(first, "first");
        assert_eq!(archive.by_index(1).unwrap().name(), "page_002.pdf");
    }

    #[tokio::test]
    async fn test_empty_entry_list_is_valid_archive() {
        let out = tempfile::tempdir().unwrap();

        let path = ArchiveAssembler::new(out.path())
            .assemble("empty.zip", Vec::new())
            .await
            .unwrap();

        assert!(read_names(&path).is_empty());
    }

    #[tokio::test]
    async fn test_missing_source_removes_partial_archive() {
        let out = tempfile::tempdir().unwrap();

        let err = ArchiveAssembler::new(out.path())
            .assemble(
                "broken.zip",
                vec![ArchiveEntry::new("page_001.pdf", out.path().join("missing.pdf"))],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, JobError::ArchiveFailure { .. }));
        assert!(!out.path().join("broken.zip").exists());
    }

    #[tokio::test]
    async fn test_missing_output_dir_is_archive_failure() {
        let out = tempfile::tempdir().unwrap();
        let missing = out.path().join("nope");

        let err = ArchiveAssembler::new(&missing)
            .assemble("x.zip", Vec::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            JobError::ArchiveFailure {
                source: ArchiveError::Io(_),
                ..
            }
        ));
    }
}
