use crate::backend::GenerativeBackend;
use crate::config::GeminiConfig;
use crate::prompts;
use crate::types::{ExtractionMode, Language, MediaKind};
use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gemini API のベースURL
const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini API クライアント
///
/// プロセス起動時に1つだけ作成し、すべてのAPI呼び出しで再利用する。
/// HTTPクライアント・APIキー・モデル名・リトライポリシーを保持し、
/// 必要とするコンポーネントへ参照で渡す。
///
/// 一時的な失敗（通信エラー、HTTP 5xx/429）は `max_retries` 回まで
/// バックオフ付きでリトライする。4xxは即座にエラーを返す。
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    config: GeminiConfig,
}

impl GeminiClient {
    /// 新しいクライアントを作成
    ///
    /// APIキーは設定値を優先し、空の場合は環境変数 `GEMINI_API_KEY` を使う。
    ///
    /// # Errors
    ///
    /// APIキーがどちらにも無い場合、またはHTTPクライアントの
    /// 構築に失敗した場合にエラーを返す。
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let api_key = if config.api_key.is_empty() {
            std::env::var("GEMINI_API_KEY")
                .context("APIキーが未設定です（config の gemini.api_key または環境変数 GEMINI_API_KEY を設定してください）")?
        } else {
            config.api_key.clone()
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Gemini HTTPクライアントの作成に失敗")?;

        Ok(Self {
            client,
            api_key,
            config: config.clone(),
        })
    }

    /// generateContent エンドポイントを呼び出し
    ///
    /// リトライ対象: 通信エラー、HTTP 5xx、HTTP 429。
    async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let url = format!("{}/models/{}:generateContent", API_BASE_URL, model);
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            match self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .json(request)
                .send()
                .await
            {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response
                            .json::<GenerateContentResponse>()
                            .await
                            .context("Gemini API レスポンスのパースに失敗");
                    }

                    let body = response.text().await.unwrap_or_default();
                    let retryable = status.is_server_error()
                        || status == reqwest::StatusCode::TOO_MANY_REQUESTS;

                    if !retryable || attempt > self.config.max_retries {
                        anyhow::bail!("Gemini API エラー: {} - {}", status, body);
                    }
                    log::warn!(
                        "Gemini API エラー、リトライします ({}/{}): {} - {}",
                        attempt,
                        self.config.max_retries,
                        status,
                        body
                    );
                }
                Err(e) => {
                    if attempt > self.config.max_retries {
                        return Err(anyhow::Error::new(e).context("Gemini API リクエストに失敗"));
                    }
                    log::warn!(
                        "Gemini API リクエスト失敗、リトライします ({}/{}): {}",
                        attempt,
                        self.config.max_retries,
                        e
                    );
                }
            }

            tokio::time::sleep(Duration::from_millis(500 * u64::from(attempt))).await;
        }
    }
}

/// インライン音声ペイロードのBase64デコード
///
/// APIレスポンスのBase64文字列（標準アルファベット、パディングあり）を
/// 生バイト列に変換する。不正な文字や不正なパディングはエラー。
pub fn decode_inline_audio(base64_text: &str) -> Result<Vec<u8>> {
    BASE64_STANDARD
        .decode(base64_text)
        .context("インライン音声データのBase64デコードに失敗")
}

#[async_trait]
impl GenerativeBackend for GeminiClient {
    async fn extract_document(
        &self,
        data: &[u8],
        mime_type: &str,
        mode: ExtractionMode,
        language: Language,
    ) -> Result<String> {
        let kind = kind_from_mime(mime_type);
        let prompt = prompts::document_prompt(kind, mode, language);
        let temperature = match (kind, mode) {
            (MediaKind::Image, ExtractionMode::Describe) => 0.6,
            _ => 0.1,
        };

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::inline(mime_type, BASE64_STANDARD.encode(data)),
                    Part::text(prompt),
                ],
            }],
            generation_config: Some(GenerationConfig {
                temperature: Some(temperature),
                ..GenerationConfig::default()
            }),
            tools: None,
        };

        let response = self.generate(&self.config.text_model, &request).await?;
        first_text(&response).context("ドキュメントからテキストを抽出できませんでした")
    }

    async fn extract_youtube(&self, input: &str, language: Language) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::text(prompts::youtube_prompt(input, language))],
            }],
            generation_config: Some(GenerationConfig {
                temperature: Some(0.1),
                ..GenerationConfig::default()
            }),
            tools: Some(vec![Tool {
                google_search: GoogleSearch {},
            }]),
        };

        let response = self.generate(&self.config.text_model, &request).await?;
        first_text(&response)
            .context("動画のコンテンツを取得できませんでした（動画が公開されているか確認してください）")
    }

    async fn transcribe_audio(&self, data: &[u8], mime_type: &str) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::inline(mime_type, BASE64_STANDARD.encode(data)),
                    Part::text(prompts::TRANSCRIBE_PROMPT.to_string()),
                ],
            }],
            generation_config: Some(GenerationConfig {
                temperature: Some(0.1),
                ..GenerationConfig::default()
            }),
            tools: None,
        };

        let response = self.generate(&self.config.text_model, &request).await?;
        first_text(&response).context("音声の文字起こしに失敗しました")
    }

    async fn translate(&self, text: &str, target: Language) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::text(prompts::translate_prompt(text, target))],
            }],
            generation_config: Some(GenerationConfig {
                temperature: Some(0.2),
                ..GenerationConfig::default()
            }),
            tools: None,
        };

        let response = self.generate(&self.config.text_model, &request).await?;
        first_text(&response).with_context(|| format!("{} への翻訳に失敗しました", target))
    }

    async fn generate_script(&self, text: &str, language: Language) -> Result<String> {
        let (host1, host2) = language.host_names();
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::text(prompts::script_prompt(
                    text, language, host1, host2,
                ))],
            }],
            // 自然で変化のある話し言葉のため高めの温度を使う
            generation_config: Some(GenerationConfig {
                temperature: Some(0.75),
                ..GenerationConfig::default()
            }),
            tools: None,
        };

        let response = self.generate(&self.config.script_model, &request).await?;
        first_text(&response).context("ポッドキャスト台本の生成に失敗しました")
    }

    async fn synthesize_dialogue(
        &self,
        script: &str,
        host1_voice: &str,
        host2_voice: &str,
        language: Language,
    ) -> Result<Vec<u8>> {
        let (host1, host2) = language.host_names();
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::text(prompts::tts_prompt(script, host1, host2))],
            }],
            generation_config: Some(GenerationConfig {
                temperature: None,
                response_modalities: Some(vec!["AUDIO".to_string()]),
                speech_config: Some(SpeechConfig {
                    multi_speaker_voice_config: MultiSpeakerVoiceConfig {
                        speaker_voice_configs: vec![
                            SpeakerVoiceConfig::new(host1, host1_voice),
                            SpeakerVoiceConfig::new(host2, host2_voice),
                        ],
                    },
                }),
            }),
            tools: None,
        };

        let response = self.generate(&self.config.tts_model, &request).await?;
        let base64_audio =
            first_inline_data(&response).context("音声コンテンツが生成されませんでした")?;
        decode_inline_audio(base64_audio)
    }
}

/// MIMEタイプから入力種別を推定
///
/// プロンプト選択にのみ使用する。未知のMIMEはテキスト扱い。
fn kind_from_mime(mime_type: &str) -> MediaKind {
    if mime_type == "application/pdf" {
        MediaKind::Pdf
    } else if mime_type.starts_with("image/") {
        MediaKind::Image
    } else if mime_type.starts_with("audio/") {
        MediaKind::Audio
    } else {
        MediaKind::Text
    }
}

/// レスポンス先頭候補のテキストパートを連結して取得
fn first_text(response: &GenerateContentResponse) -> Result<String> {
    let text: String = response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        anyhow::bail!("レスポンスにテキストが含まれていません");
    }
    Ok(text)
}

/// レスポンス先頭候補のインラインデータ（Base64）を取得
fn first_inline_data(response: &GenerateContentResponse) -> Result<&str> {
    response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .and_then(|content| content.parts.iter().find_map(|p| p.inline_data.as_ref()))
        .map(|d| d.data.as_str())
        .ok_or_else(|| anyhow::anyhow!("レスポンスにインラインデータが含まれていません"))
}

// --- generateContent リクエスト/レスポンスのワイヤ型 ---
// フィールド名はAPI仕様に合わせてcamelCaseでシリアライズする。

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: String) -> Self {
        Self {
            text: Some(text),
            inline_data: None,
        }
    }

    fn inline(mime_type: &str, data: String) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.to_string(),
                data,
            }),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speech_config: Option<SpeechConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig {
    multi_speaker_voice_config: MultiSpeakerVoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MultiSpeakerVoiceConfig {
    speaker_voice_configs: Vec<SpeakerVoiceConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeakerVoiceConfig {
    speaker: String,
    voice_config: VoiceConfig,
}

impl SpeakerVoiceConfig {
    fn new(speaker: &str, voice_name: &str) -> Self {
        Self {
            speaker: speaker.to_string(),
            voice_config: VoiceConfig {
                prebuilt_voice_config: PrebuiltVoiceConfig {
                    voice_name: voice_name.to_string(),
                },
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig {
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig {
    voice_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: GoogleSearch,
}

/// 検索グラウンディングツール（空オブジェクトとしてシリアライズ）
#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization_camel_case() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::inline("application/pdf", "QUJD".to_string()),
                    Part::text("extract".to_string()),
                ],
            }],
            generation_config: Some(GenerationConfig {
                temperature: Some(0.1),
                ..GenerationConfig::default()
            }),
            tools: None,
        };

        let json: serde_json::Value = serde_json::to_value(&request).unwrap();

        assert_eq!(
            json["contents"][0]["parts"][0]["inlineData"]["mimeType"],
            "application/pdf"
        );
        assert_eq!(json["contents"][0]["parts"][0]["inlineData"]["data"], "QUJD");
        assert_eq!(json["contents"][0]["parts"][1]["text"], "extract");
        assert_eq!(json["generationConfig"]["temperature"], 0.1);
        // 未設定のフィールドは出力されない
        assert!(json["generationConfig"].get("responseModalities").is_none());
        assert!(json.get("tools").is_none());
    }

    #[test]
    fn test_speech_config_serialization() {
        let config = GenerationConfig {
            temperature: None,
            response_modalities: Some(vec!["AUDIO".to_string()]),
            speech_config: Some(SpeechConfig {
                multi_speaker_voice_config: MultiSpeakerVoiceConfig {
                    speaker_voice_configs: vec![
                        SpeakerVoiceConfig::new("Viktor", "Puck"),
                        SpeakerVoiceConfig::new("Julia", "Kore"),
                    ],
                },
            }),
        };

        let json: serde_json::Value = serde_json::to_value(&config).unwrap();
        let speakers = &json["speechConfig"]["multiSpeakerVoiceConfig"]["speakerVoiceConfigs"];

        assert_eq!(speakers[0]["speaker"], "Viktor");
        assert_eq!(
            speakers[0]["voiceConfig"]["prebuiltVoiceConfig"]["voiceName"],
            "Puck"
        );
        assert_eq!(speakers[1]["speaker"], "Julia");
        assert_eq!(
            speakers[1]["voiceConfig"]["prebuiltVoiceConfig"]["voiceName"],
            "Kore"
        );
        assert_eq!(json["responseModalities"][0], "AUDIO");
    }

    #[test]
    fn test_google_search_tool_serialization() {
        let tool = Tool {
            google_search: GoogleSearch {},
        };
        let json: serde_json::Value = serde_json::to_value(&tool).unwrap();
        assert_eq!(json["googleSearch"], serde_json::json!({}));
    }

    #[test]
    fn test_response_text_extraction() {
        let raw = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "Hello "}, {"text": "world"}]}}
            ]
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(first_text(&response).unwrap(), "Hello world");
    }

    #[test]
    fn test_response_empty_text_is_error() {
        let raw = r#"{"candidates": [{"content": {"parts": [{"text": "  "}]}}]}"#;
        let response: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert!(first_text(&response).is_err());

        let raw = r#"{"candidates": []}"#;
        let response: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert!(first_text(&response).is_err());
    }

    #[test]
    fn test_response_inline_data_extraction() {
        let raw = r#"{
            "candidates": [
                {"content": {"parts": [{"inlineData": {"mimeType": "audio/pcm", "data": "AAEC"}}]}}
            ]
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(first_inline_data(&response).unwrap(), "AAEC");
    }

    #[test]
    fn test_decode_inline_audio_roundtrip() {
        let original: Vec<u8> = (0..=255).collect();
        let encoded = BASE64_STANDARD.encode(&original);
        let decoded = decode_inline_audio(&encoded).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_decode_inline_audio_invalid() {
        // 不正な文字
        assert!(decode_inline_audio("!!invalid!!").is_err());
        // 不正なパディング
        assert!(decode_inline_audio("QUJ").is_err());
    }

    #[test]
    fn test_kind_from_mime() {
        assert_eq!(kind_from_mime("application/pdf"), MediaKind::Pdf);
        assert_eq!(kind_from_mime("image/png"), MediaKind::Image);
        assert_eq!(kind_from_mime("audio/wav"), MediaKind::Audio);
        assert_eq!(kind_from_mime("text/plain"), MediaKind::Text);
    }

    #[test]
    fn test_client_requires_api_key() {
        let config = GeminiConfig {
            api_key: "test-key".to_string(),
            ..GeminiConfig::default()
        };
        assert!(GeminiClient::new(&config).is_ok());
    }
}
