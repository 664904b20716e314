use serde::{Deserialize, Serialize};
use std::path::Path;

/// ポッドキャスト生成に対応する言語
///
/// 抽出・翻訳・台本生成の出力言語を指定する。
/// ホスト名は言語ごとに固定されている。
///
/// # Examples
///
/// ```
/// # use doc_podcast::types::Language;
/// let lang: Language = "russian".parse().unwrap();
/// assert_eq!(lang, Language::Russian);
/// assert_eq!(lang.host_names().0, "Виктор");
/// ```
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// 英語
    English,
    /// ロシア語
    Russian,
    /// スロバキア語
    Slovak,
}

impl Language {
    /// プロンプトに埋め込む英語表記の言語名
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Russian => "Russian",
            Language::Slovak => "Slovak",
        }
    }

    /// 言語ごとのホスト名ペア (ホスト1, ホスト2)
    ///
    /// ホスト1が「ガイド役」、ホスト2が「アナリスト役」。
    pub fn host_names(&self) -> (&'static str, &'static str) {
        match self {
            Language::English => ("Viktor", "Julia"),
            Language::Russian => ("Виктор", "Юлия"),
            Language::Slovak => ("Viktor", "Júlia"),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "english" => Ok(Language::English),
            "russian" => Ok(Language::Russian),
            "slovak" => Ok(Language::Slovak),
            other => Err(anyhow::anyhow!("未対応の言語です: {}", other)),
        }
    }
}

/// TTSボイスの性別
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

/// TTSのプリセットボイス定義
#[derive(Clone, Copy, Debug)]
pub struct VoiceDef {
    /// ボイス名（APIにそのまま渡す）
    pub name: &'static str,
    /// 性別（一覧表示でのグルーピング用）
    pub gender: Gender,
}

/// 利用可能なプリセットボイス一覧
///
/// TTS APIが提供する固定のボイスセット。
pub const AVAILABLE_VOICES: [VoiceDef; 5] = [
    VoiceDef {
        name: "Puck",
        gender: Gender::Male,
    },
    VoiceDef {
        name: "Charon",
        gender: Gender::Male,
    },
    VoiceDef {
        name: "Kore",
        gender: Gender::Female,
    },
    VoiceDef {
        name: "Fenrir",
        gender: Gender::Male,
    },
    VoiceDef {
        name: "Zephyr",
        gender: Gender::Female,
    },
];

/// ボイス名からボイス定義を検索
pub fn find_voice(name: &str) -> Option<&'static VoiceDef> {
    AVAILABLE_VOICES.iter().find(|v| v.name == name)
}

/// ドキュメント抽出モード
///
/// 画像に対してのみ `Describe` が意味を持つ。
/// それ以外のファイル種別では常にOCR抽出として扱われる。
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// OCR抽出（テキストをそのまま取り出す）
    Extract,
    /// スマート画像描写（画像内容を詳細に説明する）
    Describe,
}

/// 入力ファイルの種別
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaKind {
    /// PDFドキュメント
    Pdf,
    /// 画像（OCRまたは描写の対象）
    Image,
    /// プレーンテキスト
    Text,
    /// 音声（文字起こしの対象）
    Audio,
}

/// ファイル拡張子から種別とMIMEタイプを判定
///
/// 未対応の拡張子の場合は `None` を返す。
///
/// # Examples
///
/// ```
/// # use doc_podcast::types::{detect_media, MediaKind};
/// let (kind, mime) = detect_media("report.pdf".as_ref()).unwrap();
/// assert_eq!(kind, MediaKind::Pdf);
/// assert_eq!(mime, "application/pdf");
/// ```
pub fn detect_media(path: &Path) -> Option<(MediaKind, &'static str)> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let detected = match ext.as_str() {
        "pdf" => (MediaKind::Pdf, "application/pdf"),
        "png" => (MediaKind::Image, "image/png"),
        "jpg" | "jpeg" => (MediaKind::Image, "image/jpeg"),
        "webp" => (MediaKind::Image, "image/webp"),
        "gif" => (MediaKind::Image, "image/gif"),
        "txt" | "md" => (MediaKind::Text, "text/plain"),
        "wav" => (MediaKind::Audio, "audio/wav"),
        "mp3" => (MediaKind::Audio, "audio/mpeg"),
        "m4a" => (MediaKind::Audio, "audio/mp4"),
        "ogg" => (MediaKind::Audio, "audio/ogg"),
        "flac" => (MediaKind::Audio, "audio/flac"),
        _ => return None,
    };
    Some(detected)
}

/// 入力ファイルごとの処理状態
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// 未処理
    Idle,
    /// 処理中
    Processing,
    /// 抽出成功
    Success,
    /// 抽出失敗
    Error,
}

/// ポッドキャスト生成パイプラインのステージ
///
/// 台本生成 → 音声合成 → 完了 の順に遷移し、
/// いずれかのステップが失敗した場合は `Error` で終端する。
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStage {
    /// 台本生成中
    Script,
    /// 音声合成中
    Audio,
    /// 完了
    Complete,
    /// エラー終端
    Error,
}

/// パイプラインの進捗イベント
///
/// JSON形式でシリアライズして標準出力に出力される。
///
/// # JSON出力例
///
/// ```json
/// {"stage":"script","progress":10,"message":"ポッドキャスト台本を生成中"}
/// ```
#[derive(Clone, Debug, Serialize)]
pub struct PipelineEvent {
    /// 現在のステージ
    pub stage: PipelineStage,
    /// 進捗率 (0-100)
    pub progress: u8,
    /// 補足メッセージ
    pub message: String,
}

impl PipelineEvent {
    pub fn new(stage: PipelineStage, progress: u8, message: impl Into<String>) -> Self {
        Self {
            stage,
            progress,
            message: message.into(),
        }
    }
}

/// テキストの単語数をカウント
///
/// 空白区切りで単語を数える。空文字列は0を返す。
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}
