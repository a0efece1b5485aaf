use crate::ui::theme::Theme;
use ratatui::style::{Color as TuiColor, Style};
use ratatui::text::{Line, Span};
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

const CACHE_CAPACITY: usize = 64;

type CacheKey = (String, u64);

// Bounded FIFO of highlighted blocks. Streaming re-renders the same finished
// blocks on every delta, so hits are the common case.
struct HighlightCache {
    map: HashMap<CacheKey, Vec<Line<'static>>>,
    order: VecDeque<CacheKey>,
    cap: usize,
}

impl HighlightCache {
    fn new(cap: usize) -> Self {
        Self {
            map: HashMap::new(),
            order: VecDeque::new(),
            cap,
        }
    }

    fn get(&self, key: &CacheKey) -> Option<Vec<Line<'static>>> {
        self.map.get(key).cloned()
    }

    fn put(&mut self, key: CacheKey, lines: Vec<Line<'static>>) {
        if self.map.insert(key.clone(), lines).is_none() {
            self.order.push_back(key);
        }
        while self.map.len() > self.cap {
            match self.order.pop_front() {
                Some(old) => {
                    self.map.remove(&old);
                }
                None => break,
            }
        }
    }
}

static CACHE: Mutex<Option<HighlightCache>> = Mutex::new(None);

fn cache() -> MutexGuard<'static, Option<HighlightCache>> {
    CACHE.lock().unwrap_or_else(PoisonError::into_inner)
}

fn hash_block(lang: &str, code: &str, syntect_theme: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    lang.hash(&mut hasher);
    code.hash(&mut hasher);
    syntect_theme.hash(&mut hasher);
    hasher.finish()
}

pub(crate) fn normalize_lang_hint(s: &str) -> String {
    let t = s.trim().to_ascii_lowercase();
    match t.as_str() {
        "py" | "python" => "python".into(),
        "bash" | "sh" | "zsh" | "shell" | "console" => "bash".into(),
        "js" | "javascript" | "jsx" | "node" => "javascript".into(),
        "ts" | "tsx" | "typescript" => "typescript".into(),
        "yaml" | "yml" => "yaml".into(),
        "rust" | "rs" => "rust".into(),
        "c" | "h" => "c".into(),
        "cpp" | "c++" | "cc" | "cxx" | "hpp" => "cpp".into(),
        "kotlin" | "kt" => "kotlin".into(),
        "golang" => "go".into(),
        other => other.into(),
    }
}

pub(crate) fn syntect_theme_name(theme: &Theme) -> &'static str {
    if theme.is_dark() {
        "base16-ocean.dark"
    } else {
        "InspiredGitHub"
    }
}

/// Highlight a fenced code block. Returns `None` when highlighting is not
/// possible, in which case the caller renders the body plainly.
pub fn highlight_code_block(
    lang_hint: Option<&str>,
    code: &str,
    theme: &Theme,
) -> Option<Vec<Line<'static>>> {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();

    let lang = normalize_lang_hint(lang_hint.unwrap_or(""));
    let theme_name = syntect_theme_name(theme);
    let key = (lang.clone(), hash_block(&lang, code, theme_name));
    if let Some(lines) = cache().as_ref().and_then(|c| c.get(&key)) {
        return Some(lines);
    }

    let syntaxes = SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines);
    let themes = THEME_SET.get_or_init(ThemeSet::load_defaults);
    let syn_theme = themes
        .themes
        .get(theme_name)
        .or_else(|| themes.themes.get("base16-ocean.dark"))?;
    let syntax = syntaxes
        .find_syntax_by_token(&lang)
        .unwrap_or_else(|| syntaxes.find_syntax_plain_text());

    let mut highlighter = HighlightLines::new(syntax, syn_theme);
    let mut out: Vec<Line<'static>> = Vec::new();
    for line in LinesWithEndings::from(code) {
        let ranges = highlighter.highlight_line(line, syntaxes).ok()?;
        let spans: Vec<Span<'static>> = ranges
            .into_iter()
            .map(|(style, text)| {
                let fragment = text.strip_suffix('\n').unwrap_or(text);
                let fragment = fragment.strip_suffix('\r').unwrap_or(fragment);
                let fg = style.foreground;
                let mut st = Style::default().fg(TuiColor::Rgb(fg.r, fg.g, fg.b));
                if let Some(bg) = theme.code_background {
                    st = st.bg(bg);
                }
                Span::styled(fragment.to_string(), st)
            })
            .filter(|span| !span.content.is_empty())
            .collect();
        out.push(Line::from(spans));
    }

    cache()
        .get_or_insert_with(|| HighlightCache::new(CACHE_CAPACITY))
        .put(key, out.clone());
    Some(out)
}
