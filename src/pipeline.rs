use crate::backend::GenerativeBackend;
use crate::config::PodcastConfig;
use crate::types::{count_words, find_voice, Language, PipelineEvent, PipelineStage};
use crate::wav_encoder::WavEncoder;
use anyhow::{Context, Result};
use tokio::sync::mpsc;

/// パイプラインの成果物
#[derive(Clone, Debug)]
pub struct PodcastArtifacts {
    /// 生成された会話台本
    pub script: String,
    /// WAVコンテナに包んだ合成音声
    pub audio_wav: Vec<u8>,
}

/// ポッドキャスト生成パイプライン
///
/// 台本生成 → 音声合成 → WAVエンコード を順番に実行し、
/// ステージごとの進捗イベントをチャンネルへ送信する。
/// いずれかのステップが失敗した場合は `Error` イベントを送信して
/// 即座に中断し、部分的な成果物は返さない。
///
/// 進捗値はステージ固定（台本 10%、音声 50%、完了 100%）。
pub struct PodcastPipeline {
    host1_voice: String,
    host2_voice: String,
    encoder: WavEncoder,
}

impl PodcastPipeline {
    /// 新しいパイプラインを作成
    ///
    /// # Errors
    ///
    /// ボイス名がプリセット一覧に存在しない場合にエラーを返す。
    pub fn new(config: &PodcastConfig) -> Result<Self> {
        for voice in [&config.host1_voice, &config.host2_voice] {
            if find_voice(voice).is_none() {
                anyhow::bail!("未知のボイス名です: {}", voice);
            }
        }

        Ok(Self {
            host1_voice: config.host1_voice.clone(),
            host2_voice: config.host2_voice.clone(),
            encoder: WavEncoder::new(config.sample_rate, config.channels),
        })
    }

    /// パイプラインを実行
    ///
    /// # Arguments
    ///
    /// * `backend` - 生成AIバックエンド
    /// * `source_text` - 台本のソースとなるテキスト（抽出または翻訳の結果）
    /// * `language` - 台本とホスト名の言語
    /// * `events` - 進捗イベントの送信チャンネル
    pub async fn run(
        &self,
        backend: &dyn GenerativeBackend,
        source_text: &str,
        language: Language,
        events: &mpsc::Sender<PipelineEvent>,
    ) -> Result<PodcastArtifacts> {
        if source_text.trim().is_empty() {
            anyhow::bail!("ソーステキストが空です");
        }

        log::info!(
            "ポッドキャスト生成を開始: {} 語, 言語 {}",
            count_words(source_text),
            language
        );

        self.emit(events, PipelineStage::Script, 10, "ポッドキャスト台本を生成中")
            .await;

        let script = match backend.generate_script(source_text, language).await {
            Ok(script) => script,
            Err(e) => return Err(self.fail(events, e.context("台本生成に失敗")).await),
        };
        log::info!("台本生成完了: {} 語", count_words(&script));

        self.emit(events, PipelineStage::Audio, 50, "マルチスピーカー音声を合成中")
            .await;

        let pcm = match backend
            .synthesize_dialogue(&script, &self.host1_voice, &self.host2_voice, language)
            .await
        {
            Ok(pcm) => pcm,
            Err(e) => return Err(self.fail(events, e.context("音声合成に失敗")).await),
        };

        let audio_wav = match self.encoder.encode(&pcm).context("WAVエンコードに失敗") {
            Ok(wav) => wav,
            Err(e) => return Err(self.fail(events, e).await),
        };
        log::info!(
            "音声合成完了: PCM {} バイト ({:.2}秒)",
            pcm.len(),
            self.duration_seconds(pcm.len())
        );

        self.emit(events, PipelineStage::Complete, 100, "ポッドキャスト生成完了")
            .await;

        Ok(PodcastArtifacts { script, audio_wav })
    }

    /// PCMバイト数から再生時間を計算（秒）
    fn duration_seconds(&self, pcm_len: usize) -> f64 {
        let bytes_per_second =
            self.encoder.sample_rate() as f64 * self.encoder.channels() as f64 * 2.0;
        pcm_len as f64 / bytes_per_second
    }

    /// 進捗イベントを送信
    async fn emit(
        &self,
        events: &mpsc::Sender<PipelineEvent>,
        stage: PipelineStage,
        progress: u8,
        message: &str,
    ) {
        if let Err(e) = events
            .send(PipelineEvent::new(stage, progress, message))
            .await
        {
            log::warn!("進捗イベントの送信に失敗: {}", e);
        }
    }

    /// Errorイベントを送信してエラーを返す
    async fn fail(
        &self,
        events: &mpsc::Sender<PipelineEvent>,
        error: anyhow::Error,
    ) -> anyhow::Error {
        self.emit(events, PipelineStage::Error, 0, &format!("{:#}", error))
            .await;
        error
    }
}
