use crate::types::{ExtractionMode, Language};
use anyhow::Result;
use async_trait::async_trait;

/// 生成AIバックエンドの共通トレイト
///
/// ファイルプロセッサとパイプラインはこのトレイト経由で
/// 生成AI APIを呼び出す。テストではスタブ実装に差し替える。
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// ドキュメント/画像からテキストを抽出（または画像を描写）
    ///
    /// # Arguments
    ///
    /// * `data` - ファイルの生バイト列（Base64エンコードはクライアント側で行う）
    /// * `mime_type` - インラインデータのMIMEタイプ
    /// * `mode` - 抽出モード（画像のみDescribeが有効）
    /// * `language` - 描写モードでの出力言語
    async fn extract_document(
        &self,
        data: &[u8],
        mime_type: &str,
        mode: ExtractionMode,
        language: Language,
    ) -> Result<String>;

    /// YouTube動画のURLまたはタイトルからコンテンツを抽出
    ///
    /// 検索グラウンディングを使用して動画の内容と生字幕を取得する。
    async fn extract_youtube(&self, input: &str, language: Language) -> Result<String>;

    /// 音声データを文字起こし
    async fn transcribe_audio(&self, data: &[u8], mime_type: &str) -> Result<String>;

    /// テキストを指定言語に翻訳
    ///
    /// 段落構造を保持したまま翻訳する。
    async fn translate(&self, text: &str, target: Language) -> Result<String>;

    /// 2人のホストによるポッドキャスト台本を生成
    ///
    /// ホスト名は言語ごとの固定ペアを使用する。
    async fn generate_script(&self, text: &str, language: Language) -> Result<String>;

    /// 台本からマルチスピーカー音声を合成
    ///
    /// # Returns
    ///
    /// デコード済みの生PCMバイト列（16bit LE、24kHz、モノラル）。
    /// WAVコンテナへの包み込みは呼び出し側が行う。
    async fn synthesize_dialogue(
        &self,
        script: &str,
        host1_voice: &str,
        host2_voice: &str,
        language: Language,
    ) -> Result<Vec<u8>>;
}
