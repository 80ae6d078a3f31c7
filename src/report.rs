//! Report builder for abstracts
//! Splits an abstract into sentences and lays them out over fixed report sections

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Document title heading
pub const REPORT_TITLE: &str = "# レポート";

/// Heading under which the abstract is echoed verbatim
pub const ABSTRACT_HEADING: &str = "## 要旨";

/// One fixed report subdivision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Section {
    /// Heading label as rendered in the report
    pub label: &'static str,
    /// English name, used by the CLI section table
    pub name: &'static str,
    /// Body used when the abstract has no sentence for this position
    pub fallback: &'static str,
}

/// The six report sections, in the order sentences are assigned to them
pub const SECTIONS: [Section; 6] = [
    Section {
        label: "背景",
        name: "Background",
        fallback: "課題の背景と現状の問題点を整理する。",
    },
    Section {
        label: "目的",
        name: "Purpose",
        fallback: "本レポートでは要旨の内容を基に目的を明確化する。",
    },
    Section {
        label: "方法",
        name: "Method",
        fallback: "調査・実験・分析の手順を整理し、要旨に記載されたアプローチを説明する。",
    },
    Section {
        label: "結果",
        name: "Results",
        fallback: "得られた知見や主要な結果を要約する。",
    },
    Section {
        label: "考察",
        name: "Discussion",
        fallback: "結果の意味を検討し、要旨の内容から示唆される点を議論する。",
    },
    Section {
        label: "結論",
        name: "Conclusion",
        fallback: "研究のまとめと今後の展望を簡潔に述べる。",
    },
];

/// Sentence terminator plus the whitespace run that follows it
static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[。！？]\s*").expect("sentence terminator pattern is valid"));

/// Body assigned to one section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionBody {
    pub label: &'static str,
    pub body: String,
    /// False when the fallback sentence was used
    pub from_abstract: bool,
}

/// Structured result of laying an abstract out over the report sections
#[derive(Debug, Clone, Serialize)]
pub struct ReportDraft {
    /// Abstract with surrounding whitespace removed
    pub abstract_text: String,
    /// Every sentence found, including ones past the last section
    pub sentences: Vec<String>,
    /// One entry per section, in `SECTIONS` order
    pub sections: Vec<SectionBody>,
    /// Final Markdown report
    pub markdown: String,
}

/// Split text into sentences after each `。`, `！` or `？`
///
/// The terminator stays on the sentence it ends; whitespace following it is
/// dropped. Text after the last terminator forms a final sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let mut sentences = Vec::new();
    let mut last_end = 0;

    for m in SENTENCE_END.find_iter(trimmed) {
        // Terminators are single chars, so the sentence ends right after the first one
        let terminator_len = trimmed[m.start()..].chars().next().map_or(0, char::len_utf8);
        push_sentence(&mut sentences, &trimmed[last_end..m.start() + terminator_len]);
        last_end = m.end();
    }

    if last_end < trimmed.len() {
        push_sentence(&mut sentences, &trimmed[last_end..]);
    }

    sentences
}

fn push_sentence(sentences: &mut Vec<String>, fragment: &str) {
    let fragment = fragment.trim();
    if !fragment.is_empty() {
        sentences.push(fragment.to_string());
    }
}

/// Lay an abstract out over the report sections
pub fn draft_report(abstract_text: &str) -> ReportDraft {
    let trimmed = abstract_text.trim();
    let sentences = split_sentences(trimmed);

    let sections: Vec<SectionBody> = SECTIONS
        .iter()
        .enumerate()
        .map(|(i, section)| match sentences.get(i) {
            Some(sentence) => SectionBody {
                label: section.label,
                body: sentence.clone(),
                from_abstract: true,
            },
            None => SectionBody {
                label: section.label,
                body: section.fallback.to_string(),
                from_abstract: false,
            },
        })
        .collect();

    let mut lines = vec![
        REPORT_TITLE.to_string(),
        String::new(),
        format!("{}\n{}", ABSTRACT_HEADING, trimmed),
        String::new(),
    ];
    for section in &sections {
        lines.push(format!("## {}", section.label));
        lines.push(section.body.clone());
        lines.push(String::new());
    }

    let markdown = lines.join("\n").trim_end().to_string();

    ReportDraft {
        abstract_text: trimmed.to_string(),
        sentences,
        sections,
        markdown,
    }
}

/// Build the Markdown report for an abstract
pub fn build_report(abstract_text: &str) -> String {
    draft_report(abstract_text).markdown
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headings(report: &str) -> Vec<&str> {
        report.lines().filter(|l| l.starts_with('#')).collect()
    }

    #[test]
    fn test_two_sentence_example() {
        let input = "課題がある。解決する。";
        assert_eq!(split_sentences(input), vec!["課題がある。", "解決する。"]);

        let draft = draft_report(input);
        assert_eq!(draft.sections[0].body, "課題がある。");
        assert_eq!(draft.sections[1].body, "解決する。");
        for (body, section) in draft.sections[2..].iter().zip(&SECTIONS[2..]) {
            assert_eq!(body.body, section.fallback);
            assert!(!body.from_abstract);
        }
    }

    #[test]
    fn test_exact_report_layout() {
        let report = build_report("  課題がある。解決する。\n");
        let expected = "# レポート\n\
\n\
## 要旨\n\
課題がある。解決する。\n\
\n\
## 背景\n\
課題がある。\n\
\n\
## 目的\n\
解決する。\n\
\n\
## 方法\n\
調査・実験・分析の手順を整理し、要旨に記載されたアプローチを説明する。\n\
\n\
## 結果\n\
得られた知見や主要な結果を要約する。\n\
\n\
## 考察\n\
結果の意味を検討し、要旨の内容から示唆される点を議論する。\n\
\n\
## 結論\n\
研究のまとめと今後の展望を簡潔に述べる。";
        assert_eq!(report, expected);
        assert!(!report.ends_with('\n'));
    }

    #[test]
    fn test_terminators_stay_attached() {
        let sentences = split_sentences("本当か？ そうだ！\n\n次へ。");
        assert_eq!(sentences, vec!["本当か？", "そうだ！", "次へ。"]);
    }

    #[test]
    fn test_consecutive_terminators_no_empty_entries() {
        let sentences = split_sentences("えっ！？  本当。 。");
        assert!(sentences.iter().all(|s| !s.trim().is_empty()));
        assert_eq!(sentences, vec!["えっ！", "？", "本当。", "。"]);
    }

    #[test]
    fn test_trailing_text_without_terminator() {
        let sentences = split_sentences("最初の文。終わりのない文");
        assert_eq!(sentences, vec!["最初の文。", "終わりのない文"]);
    }

    #[test]
    fn test_ascii_period_does_not_split() {
        let sentences = split_sentences("Version 1.2 is out. 新版。");
        assert_eq!(sentences, vec!["Version 1.2 is out. 新版。"]);
    }

    #[test]
    fn test_empty_and_whitespace_input() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences(" \n\t\u{3000}").is_empty());

        // The builder stays total even though the workflow never calls it this way
        let draft = draft_report("   ");
        assert!(draft.sentences.is_empty());
        assert!(draft.sections.iter().all(|s| !s.from_abstract));
        assert!(draft.markdown.starts_with("# レポート\n\n## 要旨\n\n\n## 背景"));
    }

    #[test]
    fn test_exactly_six_sentences_uses_no_fallback() {
        let input = "一。二。三。四。五。六。";
        let draft = draft_report(input);
        assert!(draft.sections.iter().all(|s| s.from_abstract));
        for section in &SECTIONS {
            assert!(!draft.markdown.contains(section.fallback));
        }
        assert_eq!(draft.sections[5].body, "六。");
    }

    #[test]
    fn test_overflow_sentences_are_dropped() {
        let input = "一。二。三。四。五。六。七番目の文。八番目の文。";
        let draft = draft_report(input);
        assert_eq!(draft.sentences.len(), 8);

        // Only the echoed abstract may contain the overflow sentences
        let body = draft.markdown.split("## 背景").nth(1).unwrap();
        assert!(!body.contains("七番目の文。"));
        assert!(!body.contains("八番目の文。"));
    }

    #[test]
    fn test_heading_structure_for_any_sentence_count() {
        let expected: Vec<String> = std::iter::once(REPORT_TITLE.to_string())
            .chain(std::iter::once(ABSTRACT_HEADING.to_string()))
            .chain(SECTIONS.iter().map(|s| format!("## {}", s.label)))
            .collect();

        for count in [0usize, 1, 6, 50] {
            let input: String = (0..count).map(|i| format!("文{}。", i)).collect();
            let report = build_report(&input);
            assert_eq!(headings(&report), expected, "sentence count {}", count);
        }
    }

    #[test]
    fn test_abstract_echoed_verbatim() {
        let input = "\n  一行目。\n二行目！  \n";
        let draft = draft_report(input);
        assert_eq!(draft.abstract_text, "一行目。\n二行目！");
        assert!(draft.markdown.contains("## 要旨\n一行目。\n二行目！\n\n## 背景"));
    }

    #[test]
    fn test_deterministic() {
        let input = "同じ入力。同じ出力？";
        assert_eq!(build_report(input), build_report(input));
    }
}
