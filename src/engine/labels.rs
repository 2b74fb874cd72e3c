//! Page label formatting (`/PageLabels` number tree entries).

/// Numbering style of a label range (`/S`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelStyle {
    /// `D`: 1, 2, 3
    Decimal,
    /// `R`: I, II, III
    UpperRoman,
    /// `r`: i, ii, iii
    LowerRoman,
    /// `A`: A..Z, AA..ZZ
    UpperLetters,
    /// `a`: a..z, aa..zz
    LowerLetters,
}

impl LabelStyle {
    pub fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"D" => Some(LabelStyle::Decimal),
            b"R" => Some(LabelStyle::UpperRoman),
            b"r" => Some(LabelStyle::LowerRoman),
            b"A" => Some(LabelStyle::UpperLetters),
            b"a" => Some(LabelStyle::LowerLetters),
            _ => None,
        }
    }

    fn format(self, value: u32) -> String {
        match self {
            LabelStyle::Decimal => value.to_string(),
            LabelStyle::UpperRoman => roman(value),
            LabelStyle::LowerRoman => roman(value).to_lowercase(),
            LabelStyle::UpperLetters => letters(value),
            LabelStyle::LowerLetters => letters(value).to_lowercase(),
        }
    }
}

/// A label range starting at a zero-based page index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRange {
    pub start: u32,
    pub style: Option<LabelStyle>,
    pub prefix: String,
    /// Numeric value of the first page in the range (`/St`, default 1).
    pub first: u32,
}

impl LabelRange {
    pub fn new(start: u32) -> Self {
        Self {
            start,
            style: None,
            prefix: String::new(),
            first: 1,
        }
    }

    /// Label of `index`, which must not precede the range start.
    pub fn label(&self, index: u32) -> String {
        let mut label = self.prefix.clone();
        if let Some(style) = self.style {
            let value = self.first.saturating_add(index.saturating_sub(self.start));
            label.push_str(&style.format(value));
        }
        label
    }
}

/// Pick the range covering `index` and format its label.
///
/// `ranges` must be sorted by `start`. Empty labels count as no label.
pub fn label_for(ranges: &[LabelRange], index: u32) -> Option<String> {
    let range = ranges.iter().rev().find(|r| r.start <= index)?;
    let label = range.label(index);
    (!label.is_empty()).then_some(label)
}

fn roman(mut value: u32) -> String {
    const NUMERALS: [(u32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];

    let mut out = String::new();
    for (n, numeral) in NUMERALS {
        while value >= n {
            out.push_str(numeral);
            value -= n;
        }
    }
    out
}

fn letters(value: u32) -> String {
    if value == 0 {
        return String::new();
    }
    let letter = (b'A' + ((value - 1) % 26) as u8) as char;
    let count = ((value - 1) / 26 + 1) as usize;
    std::iter::repeat(letter).take(count).collect()
}
