use anyhow::{Context, Result};

/// WAVヘッダーの固定長（バイト）
///
/// 拡張チャンクを持たない最小構成のRIFF/WAVEヘッダー。
pub const WAV_HEADER_LEN: usize = 44;

/// WAV コンテナエンコーダー
///
/// TTS APIが返す生のPCMバイト列（16bit符号付きリトルエンディアン、
/// インターリーブ済み）を、標準のオーディオプレイヤーが追加情報なしで
/// 再生できるRIFF/WAVEコンテナに包む。
///
/// 出力は固定44バイトのヘッダー + PCMペイロードそのまま。
/// 多バイト整数フィールドはホストのバイトオーダーに関わらず
/// すべてリトルエンディアンで書き込む（RIFFフォーマットの要求）。
///
/// ビット深度は16bit固定。ByteRate/BlockAlignの係数「2」は
/// この前提を符号化したものであり、8bit/24bit/32bit/floatのPCMは
/// 対象外（上流のTTSが常に16bit PCMを返すための意図的な制限）。
///
/// 空のPCMやゼロのパラメータは、退化したWAVを生成する代わりに
/// 即時エラーとする。
///
/// # Examples
///
/// ```
/// # use doc_podcast::wav_encoder::WavEncoder;
/// let encoder = WavEncoder::new(24000, 1);
/// let wav = encoder.encode(&[0u8; 4800]).unwrap();
/// assert_eq!(wav.len(), 44 + 4800);
/// assert_eq!(&wav[0..4], b"RIFF");
/// ```
pub struct WavEncoder {
    sample_rate: u32,
    channels: u16,
}

impl WavEncoder {
    /// 新しいWAVエンコーダーを作成
    ///
    /// # Arguments
    ///
    /// * `sample_rate` - サンプリングレート (Hz)。TTSの出力は24000
    /// * `channels` - チャンネル数。TTSの出力は1（モノラル）
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    /// PCMバイト列をWAVコンテナにエンコード
    ///
    /// 入力の内容は検証しない（16bit LEインターリーブ済みであることを
    /// 呼び出し側が保証する）。出力長は常に `44 + pcm.len()`。
    ///
    /// # Errors
    ///
    /// 以下の場合にエラーを返す:
    ///
    /// - `pcm` が空
    /// - サンプリングレートまたはチャンネル数がゼロ
    /// - BlockAlign/ByteRateがヘッダーフィールドに収まらない
    /// - ペイロード長がRIFFのu32フィールドに収まらない
    pub fn encode(&self, pcm: &[u8]) -> Result<Vec<u8>> {
        if pcm.is_empty() {
            anyhow::bail!("PCMデータが空です");
        }
        if self.sample_rate == 0 {
            anyhow::bail!("サンプリングレートがゼロです");
        }
        if self.channels == 0 {
            anyhow::bail!("チャンネル数がゼロです");
        }

        let data_len =
            u32::try_from(pcm.len()).context("PCMデータがWAVコンテナの上限を超えています")?;
        let chunk_size = data_len
            .checked_add(36)
            .context("PCMデータがWAVコンテナの上限を超えています")?;

        let block_align = self
            .channels
            .checked_mul(2)
            .context("チャンネル数が大きすぎます")?;
        let byte_rate = self
            .sample_rate
            .checked_mul(u32::from(block_align))
            .context("サンプリングレートとチャンネル数の積が大きすぎます")?;

        let mut wav = Vec::with_capacity(WAV_HEADER_LEN + pcm.len());
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&chunk_size.to_le_bytes());
        wav.extend_from_slice(b"WAVE");
        wav.extend_from_slice(b"fmt ");
        wav.extend_from_slice(&16u32.to_le_bytes()); // fmtチャンクサイズ
        wav.extend_from_slice(&1u16.to_le_bytes()); // 1 = 無圧縮PCM
        wav.extend_from_slice(&self.channels.to_le_bytes());
        wav.extend_from_slice(&self.sample_rate.to_le_bytes());
        wav.extend_from_slice(&byte_rate.to_le_bytes());
        wav.extend_from_slice(&block_align.to_le_bytes());
        wav.extend_from_slice(&16u16.to_le_bytes()); // ビット深度
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&data_len.to_le_bytes());
        wav.extend_from_slice(pcm);

        Ok(wav)
    }

    /// サンプリングレートを取得
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// チャンネル数を取得
    pub fn channels(&self) -> u16 {
        self.channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn u16_le(buf: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes([buf[offset], buf[offset + 1]])
    }

    fn u32_le(buf: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes([
            buf[offset],
            buf[offset + 1],
            buf[offset + 2],
            buf[offset + 3],
        ])
    }

    #[test]
    fn test_encode_length_and_magic() {
        let encoder = WavEncoder::new(24000, 1);
        let pcm: Vec<u8> = (0..=255).collect();
        let wav = encoder.encode(&pcm).unwrap();

        assert_eq!(wav.len(), WAV_HEADER_LEN + pcm.len());
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(&wav[36..40], b"data");
    }

    #[test]
    fn test_header_fields_little_endian() {
        let encoder = WavEncoder::new(24000, 2);
        let pcm = vec![0u8; 960];
        let wav = encoder.encode(&pcm).unwrap();

        assert_eq!(u32_le(&wav, 4), 36 + 960); // ChunkSize
        assert_eq!(u32_le(&wav, 16), 16); // Subchunk1Size
        assert_eq!(u16_le(&wav, 20), 1); // AudioFormat = PCM
        assert_eq!(u16_le(&wav, 22), 2); // NumChannels
        assert_eq!(u32_le(&wav, 24), 24000); // SampleRate
        assert_eq!(u32_le(&wav, 28), 24000 * 2 * 2); // ByteRate
        assert_eq!(u16_le(&wav, 32), 4); // BlockAlign
        assert_eq!(u16_le(&wav, 34), 16); // BitsPerSample
        assert_eq!(u32_le(&wav, 40), 960); // Subchunk2Size
    }

    #[test]
    fn test_concrete_24khz_mono() {
        // 4バイトのPCM @ 24kHz モノラルの固定パターン
        let encoder = WavEncoder::new(24000, 1);
        let wav = encoder.encode(&[0x00, 0x01, 0x02, 0x03]).unwrap();

        assert_eq!(wav.len(), 48);
        assert_eq!(&wav[24..28], &[0x80, 0x3E, 0x00, 0x00]);
        assert_eq!(&wav[44..48], &[0x00, 0x01, 0x02, 0x03]);
    }

    #[test]
    fn test_payload_verbatim() {
        let encoder = WavEncoder::new(16000, 1);
        let pcm: Vec<u8> = (0..1000).map(|i| (i % 251) as u8).collect();
        let wav = encoder.encode(&pcm).unwrap();

        assert_eq!(&wav[WAV_HEADER_LEN..], pcm.as_slice());
    }

    #[test]
    fn test_roundtrip_with_independent_parser() {
        // houndで読み戻してフォーマットとサンプルが一致することを確認
        let encoder = WavEncoder::new(24000, 1);
        let samples: Vec<i16> = (0..2400)
            .map(|i| ((i as f32 * 0.05).sin() * 12000.0) as i16)
            .collect();
        let pcm: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();

        let wav = encoder.encode(&pcm).unwrap();

        let mut reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.sample_rate, 24000);
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_format, hound::SampleFormat::Int);

        let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded, samples);
    }

    #[test]
    fn test_rejects_empty_pcm() {
        let encoder = WavEncoder::new(24000, 1);
        assert!(encoder.encode(&[]).is_err());
    }

    #[test]
    fn test_rejects_zero_parameters() {
        assert!(WavEncoder::new(0, 1).encode(&[0, 0]).is_err());
        assert!(WavEncoder::new(24000, 0).encode(&[0, 0]).is_err());
    }

    #[test]
    fn test_rejects_header_field_overflow() {
        // BlockAlign (u16) がチャンネル数 * 2 で溢れる場合
        assert!(WavEncoder::new(24000, 40000).encode(&[0, 0]).is_err());
        // ByteRate (u32) がレート * BlockAlign で溢れる場合
        assert!(WavEncoder::new(3_000_000_000, 2).encode(&[0, 0]).is_err());
        // 上限ぎりぎりは通る
        let wav = WavEncoder::new(96000, 8).encode(&[0u8; 16]).unwrap();
        assert_eq!(u16_le(&wav, 32), 16); // BlockAlign
        assert_eq!(u32_le(&wav, 28), 96000 * 16); // ByteRate
    }

    #[test]
    fn test_accessors() {
        let encoder = WavEncoder::new(48000, 2);
        assert_eq!(encoder.sample_rate(), 48000);
        assert_eq!(encoder.channels(), 2);
    }
}
