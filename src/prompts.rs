//! Gemini APIへ送るプロンプトの組み立て
//!
//! 抽出・翻訳・台本生成の各プロンプトをここに集約する。
//! 温度などの生成パラメータはクライアント側で設定する。

use crate::types::{ExtractionMode, Language, MediaKind};

/// 台本生成に渡すソーステキストの上限文字数
///
/// これを超えた部分は切り捨てて `...[truncated]` を付加する。
pub const MAX_SOURCE_CHARS: usize = 800_000;

/// 音声文字起こし用プロンプト
pub const TRANSCRIBE_PROMPT: &str =
    "Transcribe the audio accurately. Focus on the spoken content and return only the transcribed text.";

/// 表データの扱いに関する共通指示
///
/// 表を行・列のまま書き写すのではなく、内容の分析として記述させる。
const TABLE_INSTRUCTION: &str = "IMPORTANT: If the document contains tables, do not just transcribe the raw rows and columns. \
Analyze the data within the tables and provide a detailed textual description of the table's contents. \
Describe trends, relationships between data points, and key insights as if a human expert were explaining the table in a report. \
Integrate this analysis naturally into the flow of the text.";

/// ドキュメント抽出プロンプトを構築
///
/// ファイル種別と抽出モードに応じてプロンプトを切り替える。
/// `Describe` モードは画像のみ有効で、それ以外はOCR抽出として扱う。
pub fn document_prompt(kind: MediaKind, mode: ExtractionMode, language: Language) -> String {
    match (kind, mode) {
        (MediaKind::Pdf, _) => format!(
            "You are an advanced OCR engine. Extract only the main body text from this PDF document. {} \
             Explicitly omit headers, footers, page numbers, and colontitles. \
             Return only the extracted text and table analysis.",
            TABLE_INSTRUCTION
        ),
        (MediaKind::Image, ExtractionMode::Describe) => format!(
            "You are an advanced visual analysis AI.\n\
             Task: Provide an extremely detailed description of this image in {lang}.\n\n\
             Instructions:\n\
             1. Identify and describe every visual element, object, and person in the photo.\n\
             2. Describe colors, lighting, style, and context.\n\
             3. If there is text in the image, transcribe it naturally as part of the description (e.g., \"The sign says...\").\n\
             4. Be descriptive and exhaustive. Do not miss small details.\n\
             5. Write the response entirely in {lang}.",
            lang = language.as_str()
        ),
        (MediaKind::Image, ExtractionMode::Extract) => format!(
            "You are an advanced OCR engine. Extract all visible text from this image. {} \
             Return only the extracted text and analysis.",
            TABLE_INSTRUCTION
        ),
        _ => format!(
            "You are an advanced OCR engine. Extract the content from this document. {} \
             Preserve the original paragraph structure using Markdown.",
            TABLE_INSTRUCTION
        ),
    }
}

/// YouTube動画のコンテンツ抽出プロンプトを構築
///
/// 検索グラウンディングを前提に、詳細な内容ドキュメントと
/// 生字幕テキストの2セクションを要求する。
pub fn youtube_prompt(input: &str, language: Language) -> String {
    let lang = language.as_str();
    format!(
        "You are an expert content extractor for YouTube videos. Your task is to provide a comprehensive text document based on the given input, in {lang}.\n\n\
         Input: \"{input}\"\n\n\
         Your output must contain two clearly distinct sections:\n\
         1. **Detailed Video Content**: A synthesized, long-form, and highly detailed analysis or full transcript of the video's content. \
         Elaborate on key points, discussions, and technical details. This section should be as extensive and detailed as possible, \
         akin to a thorough research paper or detailed lecture notes, without timestamps or speaker labels.\n\
         2. **Raw Subtitle Text**: The *entire, unedited, verbatim* subtitle text available for the video, specifically in {lang}. \
         Do NOT summarize, rephrase, or interpret this section. It must be a direct, continuous dump of the text. \
         If multiple segments are found, concatenate them without alteration. \
         If the raw subtitle text is not available in {lang} after exhaustive searching, state: \"Not available in {lang}\".\n\n\
         Instructions for extraction:\n\
         - First, identify the most relevant YouTube video based on the input (URL or title).\n\
         - Use the search tool to find the video's exact title, creator, and original URL.\n\
         - For \"Detailed Video Content\": Prioritize finding full transcripts or very detailed summaries. \
         If a complete transcript is not available, meticulously combine information from multiple reliable textual sources \
         to reconstruct the video's narrative as comprehensively as possible.\n\
         - For \"Raw Subtitle Text\": Actively search for and extract the raw, continuous subtitle text *specifically* in {lang}. \
         If found, provide it as a plain, continuous block of text, exactly as it appears.\n\
         - Filter out irrelevant search results such as title generators, video editing tools, or unrelated articles; \
         focus only on results providing actual video content, related textual analysis, or raw subtitle files.\n\n\
         OUTPUT FORMAT (in {lang}):\n\
         ---\n\
         **Video Title**: [Exact Video Title from identified video]\n\
         **Channel/Creator**: [Exact Channel/Creator Name from identified video]\n\
         **Original URL**: [Full YouTube URL of identified video]\n\n\
         **Detailed Video Content**:\n\
         [Comprehensive, in-depth text representing the video's narrative or information.]\n\n\
         **Raw Subtitle Text ({lang})**:\n\
         [The entire, unedited, verbatim subtitle text, or \"Not available in {lang}\".]\n\
         ---"
    )
}

/// 翻訳プロンプトを構築
pub fn translate_prompt(text: &str, target: Language) -> String {
    format!(
        "Translate the following text into {}. Preserve the original formatting. Do not add any remarks:\n\n{}",
        target.as_str(),
        text
    )
}

/// ポッドキャスト台本生成プロンプトを構築
///
/// 2人のホストによる「Deep Dive」形式の会話台本を要求する。
/// ソーステキストは [`MAX_SOURCE_CHARS`] で切り詰める。
pub fn script_prompt(text: &str, language: Language, host1: &str, host2: &str) -> String {
    let safe_text = truncate_source(text);
    format!(
        "Act as an AI Podcast Generator creating a \"Deep Dive\" Audio Overview.\n\n\
         SOURCE MATERIAL:\n{safe_text}\n\n\
         HOSTS:\n\
         1. {host1} (Male): The \"Guide\". Energetic, curious, sets the stage. Loves a good metaphor.\n\
         2. {host2} (Female): The \"Analyst\". Sharp, thoughtful, connects the dots. Asks \"Wait, seriously?\" to clarify points.\n\n\
         STYLE & TONE INSTRUCTIONS (CRITICAL):\n\
         - **Conversational Realism**: Use fillers naturally (\"Um\", \"Like\", \"You know\", \"I mean\").\n\
         - **No \"Hello and Welcome\"**: Start mid-thought or with a strong hook.\n\
         - **Dynamic Flow**: Interrupt each other politely. \"Wait, hang on, are you saying...\"\n\
         - **Analogies**: Explain complex data using everyday situations.\n\
         - **Reactions**: If the text has a surprising fact, REACT to it. Don't just read it.\n\
         - **Deep Dive**: Do not just summarize. Pick the most interesting insights and drill down into *why* they matter. \
         Provide a full, important, and detailed overview of the initial text content without any shortcuts.\n\n\
         TASK:\n\
         Generate a script in {lang} that sounds exactly like two smart friends discussing this content over coffee.\n\n\
         FORMAT:\n\
         {host1}: [Text]\n\
         {host2}: [Text]",
        lang = language.as_str()
    )
}

/// マルチスピーカーTTSへ渡す読み上げ指示を構築
pub fn tts_prompt(script: &str, host1: &str, host2: &str) -> String {
    format!(
        "TTS the following conversation between {host1} and {host2}. Speak naturally/informally:\n\n{script}"
    )
}

/// ソーステキストを上限文字数で切り詰め
///
/// UTF-8の文字境界を壊さないように調整する。
fn truncate_source(text: &str) -> String {
    if text.len() <= MAX_SOURCE_CHARS {
        return text.to_string();
    }
    let mut end = MAX_SOURCE_CHARS;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...[truncated]", &text[..end])
}
