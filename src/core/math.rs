//! Plain-text typesetting for display math.
//!
//! Terminals cannot draw LaTeX, so [`UnicodeMath`] maps the commonly used
//! subset onto Unicode: Greek letters, operators and relations, fractions,
//! roots, and digit/letter super- and subscripts. Anything it does not know is
//! passed through unchanged; only structurally broken input is an error.

use std::iter::Peekable;
use std::str::Chars;

use crate::core::formatter::{MathRenderer, RenderError};

/// Deepest nesting of groups and command arguments that will be typeset.
const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeMath;

impl MathRenderer for UnicodeMath {
    fn render(&self, source: &str) -> Result<String, RenderError> {
        if source.trim().is_empty() {
            return Err(RenderError::new("empty expression"));
        }
        check_braces(source)?;

        let mut chars = source.chars().peekable();
        let rendered = render_sequence(&mut chars, false, 0)?;
        Ok(collapse_whitespace(&rendered))
    }
}

fn check_braces(source: &str) -> Result<(), RenderError> {
    let mut depth: i64 = 0;
    let mut escaped = false;
    for ch in source.chars() {
        match ch {
            '\\' if !escaped => {
                escaped = true;
                continue;
            }
            '{' if !escaped => {
                depth += 1;
                if depth > MAX_DEPTH as i64 {
                    return Err(RenderError::new("groups nested too deeply"));
                }
            }
            '}' if !escaped => {
                depth -= 1;
                if depth < 0 {
                    return Err(RenderError::new("unexpected '}'"));
                }
            }
            _ => {}
        }
        escaped = false;
    }
    if depth != 0 {
        return Err(RenderError::new("unbalanced braces"));
    }
    Ok(())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Renders until end of input, or until the closing brace of the current
/// group when `in_group` is set.
fn render_sequence(
    chars: &mut Peekable<Chars<'_>>,
    in_group: bool,
    depth: usize,
) -> Result<String, RenderError> {
    let depth = descend(depth)?;
    let mut out = String::new();
    while let Some(ch) = chars.next() {
        match ch {
            '}' if in_group => return Ok(out),
            '{' => out.push_str(&render_sequence(chars, true, depth)?),
            '\\' => out.push_str(&render_command(chars, depth)?),
            '^' => out.push_str(&render_script(chars, '^', superscript, depth)?),
            '_' => out.push_str(&render_script(chars, '_', subscript, depth)?),
            '&' => out.push(' '),
            other => out.push(other),
        }
    }
    if in_group {
        return Err(RenderError::new("unterminated group"));
    }
    Ok(out)
}

/// One argument: a braced group, a command, or a single character.
fn render_argument(chars: &mut Peekable<Chars<'_>>, depth: usize) -> Result<String, RenderError> {
    let depth = descend(depth)?;
    while chars.peek().is_some_and(|c| c.is_whitespace()) {
        chars.next();
    }
    match chars.next() {
        Some('{') => render_sequence(chars, true, depth),
        Some('\\') => render_command(chars, depth),
        Some(ch) => Ok(ch.to_string()),
        None => Err(RenderError::new("missing argument")),
    }
}

fn render_command(chars: &mut Peekable<Chars<'_>>, depth: usize) -> Result<String, RenderError> {
    let mut name = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_ascii_alphabetic() {
            name.push(c);
            chars.next();
        } else {
            break;
        }
    }

    if name.is_empty() {
        return Ok(match chars.next() {
            Some('\\') => "\n".to_string(),
            Some(',' | ';' | ':' | ' ' | '!') => " ".to_string(),
            Some(other) => other.to_string(),
            None => return Err(RenderError::new("dangling backslash")),
        });
    }

    let rendered = match name.as_str() {
        "frac" | "dfrac" | "tfrac" => {
            let numerator = render_argument(chars, depth)?;
            let denominator = render_argument(chars, depth)?;
            format!("{}/{}", wrap(&numerator), wrap(&denominator))
        }
        "sqrt" => format!("√{}", wrap(&render_argument(chars, depth)?)),
        "text" | "mathrm" | "mathbf" | "mathit" | "operatorname" => {
            render_argument(chars, depth)?
        }
        "left" | "right" | "displaystyle" | "limits" => String::new(),
        other => match symbol(other) {
            Some(symbol) => symbol.to_string(),
            None if chars.peek() == Some(&'{') => {
                let argument = render_argument(chars, depth)?;
                format!("\\{other}{{{argument}}}")
            }
            None => format!("\\{other}"),
        },
    };
    Ok(rendered)
}

fn render_script(
    chars: &mut Peekable<Chars<'_>>,
    marker: char,
    map: fn(char) -> Option<char>,
    depth: usize,
) -> Result<String, RenderError> {
    let argument = render_argument(chars, depth)?;
    let mapped: Option<String> = argument.chars().map(map).collect();
    Ok(mapped.unwrap_or_else(|| format!("{marker}{}", wrap(&argument))))
}

fn descend(depth: usize) -> Result<usize, RenderError> {
    if depth >= MAX_DEPTH {
        return Err(RenderError::new("expression nested too deeply"));
    }
    Ok(depth + 1)
}

fn wrap(text: &str) -> String {
    if text.chars().count() <= 1 {
        text.to_string()
    } else {
        format!("({text})")
    }
}

fn superscript(c: char) -> Option<char> {
    Some(match c {
        '0' => '⁰',
        '1' => '¹',
        '2' => '²',
        '3' => '³',
        '4' => '⁴',
        '5' => '⁵',
        '6' => '⁶',
        '7' => '⁷',
        '8' => '⁸',
        '9' => '⁹',
        '+' => '⁺',
        '-' => '⁻',
        '=' => '⁼',
        '(' => '⁽',
        ')' => '⁾',
        'n' => 'ⁿ',
        'i' => 'ⁱ',
        _ => return None,
    })
}

fn subscript(c: char) -> Option<char> {
    Some(match c {
        '0' => '₀',
        '1' => '₁',
        '2' => '₂',
        '3' => '₃',
        '4' => '₄',
        '5' => '₅',
        '6' => '₆',
        '7' => '₇',
        '8' => '₈',
        '9' => '₉',
        '+' => '₊',
        '-' => '₋',
        '=' => '₌',
        '(' => '₍',
        ')' => '₎',
        'a' => 'ₐ',
        'e' => 'ₑ',
        'i' => 'ᵢ',
        'j' => 'ⱼ',
        'k' => 'ₖ',
        'n' => 'ₙ',
        'x' => 'ₓ',
        _ => return None,
    })
}

fn symbol(name: &str) -> Option<&'static str> {
    Some(match name {
        "alpha" => "α",
        "beta" => "β",
        "gamma" => "γ",
        "delta" => "δ",
        "epsilon" | "varepsilon" => "ε",
        "zeta" => "ζ",
        "eta" => "η",
        "theta" => "θ",
        "lambda" => "λ",
        "mu" => "μ",
        "nu" => "ν",
        "xi" => "ξ",
        "pi" => "π",
        "rho" => "ρ",
        "sigma" => "σ",
        "tau" => "τ",
        "phi" | "varphi" => "φ",
        "chi" => "χ",
        "psi" => "ψ",
        "omega" => "ω",
        "Gamma" => "Γ",
        "Delta" => "Δ",
        "Theta" => "Θ",
        "Lambda" => "Λ",
        "Pi" => "Π",
        "Sigma" => "Σ",
        "Phi" => "Φ",
        "Omega" => "Ω",
        "times" => "×",
        "cdot" => "·",
        "div" => "÷",
        "pm" => "±",
        "mp" => "∓",
        "leq" | "le" => "≤",
        "geq" | "ge" => "≥",
        "neq" | "ne" => "≠",
        "approx" => "≈",
        "equiv" => "≡",
        "sim" => "∼",
        "infty" => "∞",
        "partial" => "∂",
        "nabla" => "∇",
        "sum" => "∑",
        "prod" => "∏",
        "int" => "∫",
        "in" => "∈",
        "notin" => "∉",
        "subset" => "⊂",
        "subseteq" => "⊆",
        "cup" => "∪",
        "cap" => "∩",
        "forall" => "∀",
        "exists" => "∃",
        "to" | "rightarrow" => "→",
        "leftarrow" => "←",
        "Rightarrow" | "implies" => "⇒",
        "iff" => "⇔",
        "ldots" | "cdots" | "dots" => "…",
        "quad" | "qquad" => " ",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(source: &str) -> Result<String, RenderError> {
        UnicodeMath.render(source)
    }

    #[test]
    fn greek_and_operators_map_to_unicode() {
        assert_eq!(render(r"\alpha \times \beta").as_deref(), Ok("α × β"));
        assert_eq!(render(r"a \leq b \neq c").as_deref(), Ok("a ≤ b ≠ c"));
    }

    #[test]
    fn scripts_use_unicode_when_possible() {
        assert_eq!(render("x^2 + y_{10}").as_deref(), Ok("x² + y₁₀"));
        assert_eq!(render("e^{i\\pi}").as_deref(), Ok("e^(iπ)"));
    }

    #[test]
    fn fractions_and_roots() {
        assert_eq!(render(r"\frac{a+b}{2}").as_deref(), Ok("(a+b)/2"));
        assert_eq!(render(r"\sqrt{x^2}").as_deref(), Ok("√(x²)"));
        assert_eq!(render(r"\sqrt 2").as_deref(), Ok("√2"));
    }

    #[test]
    fn unknown_commands_pass_through() {
        assert_eq!(render(r"\mathcal{F}").as_deref(), Ok(r"\mathcal{F}"));
    }

    #[test]
    fn broken_input_is_an_error() {
        assert!(render("").is_err());
        assert!(render("   ").is_err());
        assert!(render(r"\frac{a}{b").is_err());
        assert!(render("a}").is_err());
        assert!(render(r"\frac{a}").is_err());
        assert!(render("x^").is_err());
    }

    #[test]
    fn deep_nesting_is_an_error_not_a_crash() {
        let braces = format!("{}x{}", "{".repeat(5000), "}".repeat(5000));
        assert!(render(&braces).is_err());

        let roots = format!("{}2", r"\sqrt".repeat(5000));
        assert!(render(&roots).is_err());

        let shallow = format!("{}x{}", "{".repeat(10), "}".repeat(10));
        assert_eq!(render(&shallow).as_deref(), Ok("x"));
    }

    #[test]
    fn escaped_braces_do_not_count() {
        assert_eq!(render(r"\{ x \}").as_deref(), Ok("{ x }"));
    }
}
