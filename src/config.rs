use crate::types::Language;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub podcast: PodcastConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Gemini API設定
///
/// 生成AI APIへの接続に関する設定。
///
/// # デフォルト値
///
/// - `api_key`: "" (空の場合は環境変数 GEMINI_API_KEY を使用)
/// - `text_model`: "gemini-2.5-flash" (抽出・翻訳・文字起こし用)
/// - `script_model`: "gemini-3-pro-preview" (台本生成用)
/// - `tts_model`: "gemini-2.5-flash-preview-tts" (音声合成用)
/// - `timeout_seconds`: 120 秒
/// - `max_retries`: 3 回
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeminiConfig {
    /// APIキー（空の場合は環境変数 GEMINI_API_KEY にフォールバック）
    #[serde(default)]
    pub api_key: String,
    /// 抽出・翻訳・文字起こしに使うモデル
    #[serde(default = "default_text_model")]
    pub text_model: String,
    /// 台本生成に使うモデル（創作性の高いモデルを推奨）
    #[serde(default = "default_script_model")]
    pub script_model: String,
    /// マルチスピーカーTTSに使うモデル
    #[serde(default = "default_tts_model")]
    pub tts_model: String,
    /// HTTPリクエストのタイムアウト（秒）
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// 一時的な失敗（5xx/429/通信エラー）のリトライ回数
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// ポッドキャスト生成設定
///
/// # デフォルト値
///
/// - `host1_voice`: "Puck" (男性ボイス)
/// - `host2_voice`: "Kore" (女性ボイス)
/// - `sample_rate`: 24000 Hz (TTS APIの固定出力レート)
/// - `channels`: 1 (モノラル)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PodcastConfig {
    /// ホスト1（ガイド役）のボイス名
    #[serde(default = "default_host1_voice")]
    pub host1_voice: String,
    /// ホスト2（アナリスト役）のボイス名
    #[serde(default = "default_host2_voice")]
    pub host2_voice: String,
    /// TTS出力のサンプリングレート (Hz)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// TTS出力のチャンネル数
    #[serde(default = "default_channels")]
    pub channels: u16,
}

/// 抽出設定
///
/// # デフォルト値
///
/// - `language`: "english"
/// - `describe_images`: false (画像はOCR抽出)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractConfig {
    /// 抽出・台本生成の言語
    #[serde(default = "default_language")]
    pub language: Language,
    /// 画像をOCRせず詳細に描写するモード
    #[serde(default)]
    pub describe_images: bool,
}

/// 出力設定
///
/// # デフォルト値
///
/// - `output_dir`: "./output"
/// - `log_level`: "info"
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// Default functions
fn default_text_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_script_model() -> String {
    "gemini-3-pro-preview".to_string()
}

fn default_tts_model() -> String {
    "gemini-2.5-flash-preview-tts".to_string()
}

fn default_timeout_seconds() -> u64 {
    120 // 台本生成は長文になるため長めに取る
}

fn default_max_retries() -> u32 {
    3
}

fn default_host1_voice() -> String {
    "Puck".to_string()
}

fn default_host2_voice() -> String {
    "Kore".to_string()
}

fn default_sample_rate() -> u32 {
    24000 // TTS APIの固定出力レート
}

fn default_channels() -> u16 {
    1
}

fn default_language() -> Language {
    Language::English
}

fn default_output_dir() -> String {
    "./output".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini: GeminiConfig::default(),
            podcast: PodcastConfig::default(),
            extract: ExtractConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            text_model: default_text_model(),
            script_model: default_script_model(),
            tts_model: default_tts_model(),
            timeout_seconds: default_timeout_seconds(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for PodcastConfig {
    fn default() -> Self {
        Self {
            host1_voice: default_host1_voice(),
            host2_voice: default_host2_voice(),
            sample_rate: default_sample_rate(),
            channels: default_channels(),
        }
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            describe_images: false,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// 設定ファイルから読み込み
    ///
    /// TOML形式の設定ファイルをパースしてConfig構造体を生成する。
    ///
    /// # Errors
    ///
    /// ファイルの読み込みまたはパースに失敗した場合にエラーを返す。
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use doc_podcast::config::Config;
    /// let config = Config::from_file("config.toml").unwrap();
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("設定ファイルの読み込みに失敗: {:?}", path.as_ref()))?;
        let config: Config =
            toml::from_str(&content).with_context(|| "設定ファイルのパースに失敗")?;
        Ok(config)
    }

    /// デフォルト設定をファイルに書き出し
    ///
    /// 既存のファイルは上書きされる。
    ///
    /// # Errors
    ///
    /// ファイルの書き込みに失敗した場合にエラーを返す。
    pub fn write_default<P: AsRef<Path>>(path: P) -> Result<()> {
        let config = Config::default();
        let content =
            toml::to_string_pretty(&config).with_context(|| "設定のシリアライズに失敗")?;
        fs::write(path.as_ref(), content)
            .with_context(|| format!("設定ファイルの書き込みに失敗: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// 設定ファイルがあれば読み込み、なければデフォルトを使用
    ///
    /// # Errors
    ///
    /// ファイルが存在するがパースに失敗した場合にエラーを返す。
    /// ファイルが存在しない場合はエラーにならず、デフォルト設定を返す。
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            log::warn!(
                "設定ファイルが見つかりません。デフォルト設定を使用します: {:?}",
                path.as_ref()
            );
            Ok(Config::default())
        }
    }
}
