//! doc-podcast - ドキュメントから2人ホストのポッドキャストを生成するシステム
//!
//! このクレートは、ドキュメント・画像・音声ファイル・YouTube動画・
//! プレーンテキストを入力として受け取り、Gemini APIを使用して
//! テキスト抽出（OCR/描写/文字起こし）、翻訳、会話台本の生成、
//! マルチスピーカー音声合成を行うパイプラインを提供します。
//!
//! # 主な機能
//!
//! - **マルチファイル抽出**: PDF・画像・音声・テキストを逐次処理し、
//!   個別の失敗を記録しながら残りを継続
//! - **翻訳**: 段落構造を保持したままターゲット言語へ翻訳
//! - **ポッドキャスト生成**: 台本生成 → 音声合成 → WAVエンコードの
//!   明示的なステージを持つパイプライン（進捗イベント付き）
//! - **WAVコンテナエンコード**: TTSが返す生PCMを44バイトの
//!   RIFF/WAVEヘッダーで包み、そのまま再生可能なファイルにする
//!
//! # アーキテクチャ
//!
//! ```text
//! [Files / YouTube / Text] → [FileProcessor] ─┐
//!                                             │ 抽出テキスト
//!                                             ↓
//!                                      [translate (任意)]
//!                                             │
//!                                             ↓
//!                                     [PodcastPipeline]
//!                                   script → audio → complete
//!                                      │         │
//!                                      ↓         ↓
//!                                  [台本 .txt] [WavEncoder] → [.wav]
//!
//! すべてのAI呼び出しは GeminiClient (GenerativeBackend) を経由する
//! ```
//!
//! # 使用例
//!
//! ```no_run
//! use doc_podcast::config::Config;
//!
//! // 設定ファイルを読み込み
//! let config = Config::load_or_default("config.toml").unwrap();
//!
//! // またはデフォルト設定を生成
//! Config::write_default("config.toml").unwrap();
//! ```

pub mod backend;
pub mod config;
pub mod file_processor;
pub mod gemini;
pub mod pipeline;
pub mod prompts;
pub mod types;
pub mod wav_encoder;
