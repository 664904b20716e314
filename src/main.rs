use anyhow::{Context, Result};
use doc_podcast::backend::GenerativeBackend;
use doc_podcast::config::Config;
use doc_podcast::file_processor::FileProcessor;
use doc_podcast::gemini::GeminiClient;
use doc_podcast::pipeline::PodcastPipeline;
use doc_podcast::types::{count_words, ExtractionMode, Language, PipelineEvent, AVAILABLE_VOICES};
use env_logger::Env;
use std::path::PathBuf;
use tokio::sync::mpsc;

const USAGE: &str = "\
doc-podcast - ドキュメントからポッドキャストを生成

USAGE:
    doc-podcast [OPTIONS] [FILES]...

ARGS:
    [FILES]...             入力ファイル (pdf, png, jpg, webp, gif, txt, md, wav, mp3, m4a, ogg, flac)

OPTIONS:
    --config <PATH>        設定ファイルのパス (デフォルト: config.toml)
    --text <TEXT>          プレーンテキストを直接入力
    --youtube <INPUT>      YouTube動画のURLまたはタイトルから抽出
    --translate <LANG>     抽出後に翻訳する (english / russian / slovak)
    --describe             画像をOCRせず詳細に描写する
    --extract-only         抽出（と翻訳）のみ実行し、ポッドキャストは生成しない
    --generate-config [PATH]  デフォルト設定ファイルを生成して終了（最初の引数として指定）
    --list-voices          利用可能なTTSボイスを表示して終了（最初の引数として指定）
    --help                 このヘルプを表示

入力ソース（ファイル、--youtube、--text）はいずれか1つだけ指定できる。";

#[derive(Debug, Default)]
struct CliArgs {
    config_path: String,
    files: Vec<PathBuf>,
    youtube: Option<String>,
    text: Option<String>,
    translate: Option<Language>,
    describe: bool,
    extract_only: bool,
}

fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut cli = CliArgs {
        config_path: "config.toml".to_string(),
        ..CliArgs::default()
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                cli.config_path = iter
                    .next()
                    .context("--config にはパスの指定が必要です")?
                    .clone();
            }
            "--youtube" => {
                cli.youtube = Some(
                    iter.next()
                        .context("--youtube にはURLまたはタイトルの指定が必要です")?
                        .clone(),
                );
            }
            "--text" => {
                cli.text = Some(
                    iter.next()
                        .context("--text にはテキストの指定が必要です")?
                        .clone(),
                );
            }
            "--translate" => {
                cli.translate = Some(
                    iter.next()
                        .context("--translate には言語の指定が必要です")?
                        .parse()?,
                );
            }
            "--describe" => cli.describe = true,
            "--extract-only" => cli.extract_only = true,
            "--generate-config" | "--list-voices" => {
                anyhow::bail!("{} は最初の引数として指定してください", arg);
            }
            flag if flag.starts_with("--") => {
                anyhow::bail!("未知のオプションです: {}", flag);
            }
            file => cli.files.push(PathBuf::from(file)),
        }
    }

    // 入力ソースの組み合わせを検証（暗黙の優先順位で片方を無視しない）
    let source_count = usize::from(!cli.files.is_empty())
        + usize::from(cli.youtube.is_some())
        + usize::from(cli.text.is_some());
    if source_count > 1 {
        anyhow::bail!("入力ソースはファイル、--youtube、--text のいずれか1つだけ指定してください");
    }

    Ok(cli)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    // ヘルプ表示モード
    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("{}", USAGE);
        return Ok(());
    }

    // 設定ファイル生成モード
    if args.first().map(String::as_str) == Some("--generate-config") {
        let config_path = args.get(1).map(String::as_str).unwrap_or("config.toml");
        Config::write_default(config_path)?;
        println!("設定ファイルを生成しました: {}", config_path);
        return Ok(());
    }

    // ボイス一覧表示モード
    if args.first().map(String::as_str) == Some("--list-voices") {
        println!("利用可能なボイス:");
        for voice in AVAILABLE_VOICES {
            println!("  {:<8} ({:?})", voice.name, voice.gender);
        }
        return Ok(());
    }

    let cli = parse_args(&args)?;

    // 設定を読み込み
    let config = Config::load_or_default(&cli.config_path)?;

    // ロガーを初期化（設定のログレベルをデフォルトに、環境変数で上書き可能）
    env_logger::Builder::from_env(Env::default().default_filter_or(&config.output.log_level))
        .format_timestamp(None)
        .init();

    log::info!("doc-podcast を起動します");

    if cli.files.is_empty() && cli.youtube.is_none() && cli.text.is_none() {
        eprintln!("{}", USAGE);
        anyhow::bail!("入力が指定されていません（ファイル、--youtube、--text のいずれか）");
    }

    // APIクライアントは起動時に1つだけ作成し、全コンポーネントで共有する
    let client = GeminiClient::new(&config.gemini)?;

    let language = config.extract.language;
    let mode = if cli.describe || config.extract.describe_images {
        ExtractionMode::Describe
    } else {
        ExtractionMode::Extract
    };

    // 抽出フェーズ
    let extracted = if let Some(text) = &cli.text {
        log::info!("プレーンテキスト入力を使用します ({} 語)", count_words(text));
        text.clone()
    } else if let Some(input) = &cli.youtube {
        log::info!("YouTubeコンテンツを抽出中: {}", input);
        client.extract_youtube(input, language).await?
    } else {
        let processor = FileProcessor::new(mode, language);
        let report = processor.extract_all(&client, &cli.files).await?;
        log::info!(
            "{}/{} ファイルの抽出に成功",
            report.success_count(),
            report.files.len()
        );
        report.combined_text
    };

    // 出力ディレクトリを準備
    let output_dir = PathBuf::from(&config.output.output_dir);
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("出力ディレクトリの作成に失敗: {:?}", output_dir))?;

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();

    let extracted_path = output_dir.join(format!("extracted_{}.txt", timestamp));
    std::fs::write(&extracted_path, &extracted)
        .with_context(|| format!("抽出テキストの書き込みに失敗: {:?}", extracted_path))?;
    log::info!(
        "抽出テキストを保存しました: {:?} ({} 語)",
        extracted_path,
        count_words(&extracted)
    );

    // 翻訳フェーズ（任意）
    let (podcast_text, podcast_language) = if let Some(target) = cli.translate {
        log::info!("{} へ翻訳中", target);
        let translated = client.translate(&extracted, target).await?;

        let translated_path = output_dir.join(format!("translated_{}.txt", timestamp));
        std::fs::write(&translated_path, &translated)
            .with_context(|| format!("翻訳テキストの書き込みに失敗: {:?}", translated_path))?;
        log::info!("翻訳テキストを保存しました: {:?}", translated_path);

        (translated, target)
    } else {
        (extracted, language)
    };

    if cli.extract_only {
        log::info!("抽出のみ指定のため終了します");
        return Ok(());
    }

    // ポッドキャスト生成フェーズ
    let pipeline = PodcastPipeline::new(&config.podcast)?;
    let (event_tx, mut event_rx) = mpsc::channel::<PipelineEvent>(16);

    // 進捗イベントをJSON行として標準出力へ
    let printer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            if let Ok(json) = serde_json::to_string(&event) {
                println!("{}", json);
            }
        }
    });

    let result = pipeline
        .run(&client, &podcast_text, podcast_language, &event_tx)
        .await;
    drop(event_tx);
    let _ = printer.await;
    let artifacts = result?;

    let script_path = output_dir.join(format!("podcast_{}.txt", timestamp));
    std::fs::write(&script_path, &artifacts.script)
        .with_context(|| format!("台本の書き込みに失敗: {:?}", script_path))?;
    log::info!("台本を保存しました: {:?}", script_path);

    let wav_path = output_dir.join(format!("podcast_{}.wav", timestamp));
    std::fs::write(&wav_path, &artifacts.audio_wav)
        .with_context(|| format!("WAVファイルの書き込みに失敗: {:?}", wav_path))?;
    log::info!(
        "ポッドキャスト音声を保存しました: {:?} ({} バイト)",
        wav_path,
        artifacts.audio_wav.len()
    );

    log::info!("doc-podcast を終了しました");

    Ok(())
}
