use crate::backend::GenerativeBackend;
use crate::types::{count_words, detect_media, ExtractionMode, FileStatus, Language, MediaKind};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// 複数ファイル間の抽出テキストの区切り
const TEXT_SEPARATOR: &str = "\n\n---\n\n";

/// ファイルごとの処理結果
#[derive(Clone, Debug)]
pub struct FileResult {
    /// 入力ファイルのパス
    pub path: PathBuf,
    /// 最終状態（Success または Error）
    pub status: FileStatus,
    /// 失敗時のエラーメッセージ
    pub error: Option<String>,
}

/// 抽出処理全体の結果
#[derive(Clone, Debug)]
pub struct ExtractionReport {
    /// 成功したファイルのテキストを区切り付きで連結したもの
    pub combined_text: String,
    /// ファイルごとの結果（入力順）
    pub files: Vec<FileResult>,
}

impl ExtractionReport {
    /// 成功したファイル数
    pub fn success_count(&self) -> usize {
        self.files
            .iter()
            .filter(|f| f.status == FileStatus::Success)
            .count()
    }
}

/// 複数ファイルの逐次抽出プロセッサ
///
/// 入力ファイルを1つずつ順番に処理する。あるファイルが失敗しても
/// エラーを記録して次のファイルへ進み、すべてのファイルが失敗して
/// 抽出テキストが空になった場合のみ全体をエラーとする。
///
/// 音声ファイルは文字起こしへ、PDF・画像・テキストは
/// ドキュメント抽出へ振り分ける。
pub struct FileProcessor {
    mode: ExtractionMode,
    language: Language,
}

impl FileProcessor {
    pub fn new(mode: ExtractionMode, language: Language) -> Self {
        Self { mode, language }
    }

    /// すべての入力ファイルを順次処理
    ///
    /// # Errors
    ///
    /// 1ファイルも抽出できなかった場合にエラーを返す。
    /// 個別ファイルの失敗は `ExtractionReport::files` に記録される。
    pub async fn extract_all(
        &self,
        backend: &dyn GenerativeBackend,
        paths: &[PathBuf],
    ) -> Result<ExtractionReport> {
        let mut texts: Vec<String> = Vec::new();
        let mut files: Vec<FileResult> = paths
            .iter()
            .map(|path| FileResult {
                path: path.clone(),
                status: FileStatus::Idle,
                error: None,
            })
            .collect();

        for (index, path) in paths.iter().enumerate() {
            files[index].status = FileStatus::Processing;
            log::info!(
                "ファイル {}/{} を処理中: {:?}",
                index + 1,
                paths.len(),
                path
            );

            match self.extract_one(backend, path).await {
                Ok(text) => {
                    log::info!("抽出完了: {:?} ({} 語)", path, count_words(&text));
                    texts.push(text);
                    files[index].status = FileStatus::Success;
                }
                Err(e) => {
                    log::error!("ファイル処理エラー: {:?} - {:#}", path, e);
                    files[index].status = FileStatus::Error;
                    files[index].error = Some(format!("{:#}", e));
                }
            }
        }

        let combined_text = combine_texts(&texts);
        if combined_text.is_empty() {
            anyhow::bail!("すべてのファイルの抽出に失敗しました");
        }

        Ok(ExtractionReport {
            combined_text,
            files,
        })
    }

    /// 1ファイルを種別に応じて抽出
    async fn extract_one(&self, backend: &dyn GenerativeBackend, path: &Path) -> Result<String> {
        let (kind, mime_type) = detect_media(path)
            .ok_or_else(|| anyhow::anyhow!("未対応のファイル形式です: {:?}", path))?;

        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("ファイルの読み込みに失敗: {:?}", path))?;

        match kind {
            MediaKind::Audio => backend.transcribe_audio(&data, mime_type).await,
            _ => {
                // Describeモードは画像にのみ適用する
                let mode = if kind == MediaKind::Image {
                    self.mode
                } else {
                    ExtractionMode::Extract
                };
                backend
                    .extract_document(&data, mime_type, mode, self.language)
                    .await
            }
        }
    }
}

/// 抽出テキストを区切り付きで連結
fn combine_texts(texts: &[String]) -> String {
    texts
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(TEXT_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::io::Write;
    use tempfile::TempDir;

    /// 呼び出し内容を記録し、指定した応答を返すスタブバックエンド
    struct StubBackend {
        fail_on: Option<&'static str>,
    }

    #[async_trait]
    impl GenerativeBackend for StubBackend {
        async fn extract_document(
            &self,
            _data: &[u8],
            mime_type: &str,
            _mode: ExtractionMode,
            _language: Language,
        ) -> Result<String> {
            if Some(mime_type) == self.fail_on {
                anyhow::bail!("抽出失敗（スタブ）");
            }
            Ok(format!("extracted:{}", mime_type))
        }

        async fn extract_youtube(&self, _input: &str, _language: Language) -> Result<String> {
            Ok("youtube".to_string())
        }

        async fn transcribe_audio(&self, _data: &[u8], mime_type: &str) -> Result<String> {
            Ok(format!("transcribed:{}", mime_type))
        }

        async fn translate(&self, text: &str, _target: Language) -> Result<String> {
            Ok(format!("translated:{}", text))
        }

        async fn generate_script(&self, _text: &str, _language: Language) -> Result<String> {
            Ok("script".to_string())
        }

        async fn synthesize_dialogue(
            &self,
            _script: &str,
            _host1_voice: &str,
            _host2_voice: &str,
            _language: Language,
        ) -> Result<Vec<u8>> {
            Ok(vec![0u8; 4])
        }
    }

    fn write_file(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content).unwrap();
        path
    }

    #[test]
    fn test_combine_texts() {
        let texts = vec![
            "first".to_string(),
            "  ".to_string(),
            "second\n".to_string(),
        ];
        assert_eq!(combine_texts(&texts), "first\n\n---\n\nsecond");
        assert_eq!(combine_texts(&[]), "");
    }

    #[tokio::test]
    async fn test_extract_all_success() {
        let dir = TempDir::new().unwrap();
        let pdf = write_file(&dir, "doc.pdf", b"%PDF");
        let audio = write_file(&dir, "rec.wav", b"RIFF");

        let backend = StubBackend { fail_on: None };
        let processor = FileProcessor::new(ExtractionMode::Extract, Language::English);
        let report = processor
            .extract_all(&backend, &[pdf, audio])
            .await
            .unwrap();

        assert_eq!(report.success_count(), 2);
        assert_eq!(
            report.combined_text,
            "extracted:application/pdf\n\n---\n\ntranscribed:audio/wav"
        );
        assert!(report.files.iter().all(|f| f.error.is_none()));
    }

    #[tokio::test]
    async fn test_extract_all_continues_after_error() {
        let dir = TempDir::new().unwrap();
        let pdf = write_file(&dir, "doc.pdf", b"%PDF");
        let image = write_file(&dir, "photo.png", b"PNG");

        // PDFだけ失敗させる
        let backend = StubBackend {
            fail_on: Some("application/pdf"),
        };
        let processor = FileProcessor::new(ExtractionMode::Extract, Language::English);
        let report = processor.extract_all(&backend, &[pdf, image]).await.unwrap();

        assert_eq!(report.success_count(), 1);
        assert_eq!(report.files[0].status, FileStatus::Error);
        assert!(report.files[0].error.as_ref().unwrap().contains("抽出失敗"));
        assert_eq!(report.files[1].status, FileStatus::Success);
        assert_eq!(report.combined_text, "extracted:image/png");
    }

    #[tokio::test]
    async fn test_extract_all_fails_when_nothing_extracted() {
        let dir = TempDir::new().unwrap();
        let pdf = write_file(&dir, "doc.pdf", b"%PDF");

        let backend = StubBackend {
            fail_on: Some("application/pdf"),
        };
        let processor = FileProcessor::new(ExtractionMode::Extract, Language::English);
        let result = processor.extract_all(&backend, &[pdf]).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_unsupported_extension_is_per_file_error() {
        let dir = TempDir::new().unwrap();
        let docx = write_file(&dir, "doc.docx", b"PK");
        let txt = write_file(&dir, "notes.txt", b"hello");

        let backend = StubBackend { fail_on: None };
        let processor = FileProcessor::new(ExtractionMode::Extract, Language::English);
        let report = processor.extract_all(&backend, &[docx, txt]).await.unwrap();

        assert_eq!(report.files[0].status, FileStatus::Error);
        assert!(report.files[0]
            .error
            .as_ref()
            .unwrap()
            .contains("未対応のファイル形式"));
        assert_eq!(report.files[1].status, FileStatus::Success);
    }
}
