//! Helvetica metrics, WinAnsi encoding and line wrapping.
//!
//! The document uses the builtin Helvetica Type1 font, so no font program is
//! embedded and widths come from the standard AFM table. Text is encoded as
//! WinAnsi; characters outside it are drawn as `?`.

/// Glyph advance widths (1/1000 em) for ASCII 32..=126.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

const DEFAULT_WIDTH: u16 = 556;

/// Distance from the top of a line box to the baseline, in em.
pub const ASCENT: f32 = 0.718;

/// Line box height in em (ascender + line gap + descender).
pub const LINE_HEIGHT: f32 = 1.156;

fn glyph_width(c: char) -> u16 {
    match c as u32 {
        code @ 32..=126 => HELVETICA_WIDTHS[(code - 32) as usize],
        0xA0 => 278,
        _ => DEFAULT_WIDTH,
    }
}

/// Rendered width of `text` at `size` points.
pub fn text_width(text: &str, size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| glyph_width(c) as u32).sum();
    units as f32 * size / 1000.0
}

/// Encode `text` as WinAnsi bytes for a `Tj` string literal.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi_byte).collect()
}

fn win_ansi_byte(c: char) -> u8 {
    match c {
        ' '..='~' => c as u8,
        '\t' => b' ',
        '\u{A0}'..='\u{FF}' => c as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => b'?',
    }
}

/// Greedy word wrap of a single line to `max_width` points.
///
/// Leading indentation is kept on the first line. Words wider than the line
/// are broken between characters. Always returns at least one line.
pub fn wrap_line(line: &str, size: f32, max_width: f32) -> Vec<String> {
    if text_width(line, size) <= max_width {
        return vec![line.to_string()];
    }

    let indent_len = line.len() - line.trim_start_matches(' ').len();
    let (indent, rest) = line.split_at(indent_len);

    let mut lines = Vec::new();
    let mut current = indent.to_string();

    for word in rest.split(' ') {
        let candidate = if current.trim().is_empty() {
            format!("{current}{word}")
        } else {
            format!("{current} {word}")
        };
        if text_width(&candidate, size) <= max_width {
            current = candidate;
            continue;
        }

        if !current.trim().is_empty() {
            lines.push(std::mem::take(&mut current));
        } else {
            current.clear();
        }

        if text_width(word, size) <= max_width {
            current = word.to_string();
            continue;
        }

        for c in word.chars() {
            current.push(c);
            if text_width(&current, size) > max_width && current.chars().count() > 1 {
                current.pop();
                lines.push(std::mem::take(&mut current));
                current.push(c);
            }
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_follow_afm_table() {
        assert_eq!(text_width("i", 1000.0), 222.0);
        assert_eq!(text_width("W", 1000.0), 944.0);
        assert!((text_width("Floor 1", 10.0) - 31.12).abs() < 0.01);
    }

    #[test]
    fn win_ansi_maps_latin1_and_punctuation() {
        assert_eq!(encode_win_ansi("Aé"), vec![b'A', 0xE9]);
        assert_eq!(encode_win_ansi("“x”"), vec![0x93, b'x', 0x94]);
        assert_eq!(encode_win_ansi("…"), vec![0x85]);
        assert_eq!(encode_win_ansi("日"), vec![b'?']);
    }

    #[test]
    fn short_line_is_untouched() {
        assert_eq!(wrap_line("  \"floors\": 2,", 8.0, 495.0), vec!["  \"floors\": 2,"]);
    }

    #[test]
    fn long_line_wraps_on_words() {
        let line = "alpha beta gamma delta epsilon zeta eta theta";
        let wrapped = wrap_line(line, 10.0, 100.0);
        assert!(wrapped.len() > 1);
        for l in &wrapped {
            assert!(text_width(l, 10.0) <= 100.0, "too wide: {l:?}");
        }
        assert_eq!(wrapped.join(" "), line);
    }

    #[test]
    fn unbroken_word_is_split_by_character() {
        let word = "x".repeat(200);
        let wrapped = wrap_line(&word, 10.0, 100.0);
        assert!(wrapped.len() > 1);
        assert_eq!(wrapped.concat(), word);
    }

    #[test]
    fn empty_line_yields_one_empty_line() {
        assert_eq!(wrap_line("", 10.0, 100.0), vec![String::new()]);
    }
}
