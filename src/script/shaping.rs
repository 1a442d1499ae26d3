//! Contextual glyph shaping for Arabic-script text
//!
//! OCR output and plain Unicode storage keep Arabic-family letters in their
//! base (unjoined) form; rendering them readably requires selecting the
//! isolated/final/initial/medial presentation form of each letter from its
//! neighbors. This module implements that joining pass for the Arabic base
//! block plus the Urdu additions, including the lam-alef ligatures.
//!
//! Characters without an entry in the joining table (Latin, digits,
//! punctuation, already-shaped presentation forms) pass through unchanged,
//! which also makes the transform idempotent.

/// Presentation forms of one base letter.
///
/// `final_`, `initial` and `medial` are absent for letters that do not join
/// on the corresponding side; selection falls back toward `isolated`.
struct Forms {
    isolated: char,
    final_: Option<char>,
    initial: Option<char>,
    medial: Option<char>,
}

impl Forms {
    const fn dual(isolated: char, final_: char, initial: char, medial: char) -> Self {
        Self {
            isolated,
            final_: Some(final_),
            initial: Some(initial),
            medial: Some(medial),
        }
    }

    const fn right(isolated: char, final_: char) -> Self {
        Self {
            isolated,
            final_: Some(final_),
            initial: None,
            medial: None,
        }
    }

    const fn none(isolated: char) -> Self {
        Self {
            isolated,
            final_: None,
            initial: None,
            medial: None,
        }
    }

    /// Whether this letter connects to the following letter.
    fn joins_left(&self) -> bool {
        self.initial.is_some()
    }

    /// Whether this letter connects to the preceding letter.
    fn joins_right(&self) -> bool {
        self.final_.is_some()
    }
}

/// Joining table for the Arabic base block (U+0621..U+064A) and the
/// Urdu/Persian additions used in Pakistani chat text.
fn forms(c: char) -> Option<Forms> {
    let f = match c {
        '\u{0621}' => Forms::none('\u{FE80}'),                                   // hamza
        '\u{0622}' => Forms::right('\u{FE81}', '\u{FE82}'),                      // alef madda
        '\u{0623}' => Forms::right('\u{FE83}', '\u{FE84}'),                      // alef hamza above
        '\u{0624}' => Forms::right('\u{FE85}', '\u{FE86}'),                      // waw hamza
        '\u{0625}' => Forms::right('\u{FE87}', '\u{FE88}'),                      // alef hamza below
        '\u{0626}' => Forms::dual('\u{FE89}', '\u{FE8A}', '\u{FE8B}', '\u{FE8C}'), // yeh hamza
        '\u{0627}' => Forms::right('\u{FE8D}', '\u{FE8E}'),                      // alef
        '\u{0628}' => Forms::dual('\u{FE8F}', '\u{FE90}', '\u{FE91}', '\u{FE92}'), // beh
        '\u{0629}' => Forms::right('\u{FE93}', '\u{FE94}'),                      // teh marbuta
        '\u{062A}' => Forms::dual('\u{FE95}', '\u{FE96}', '\u{FE97}', '\u{FE98}'), // teh
        '\u{062B}' => Forms::dual('\u{FE99}', '\u{FE9A}', '\u{FE9B}', '\u{FE9C}'), // theh
        '\u{062C}' => Forms::dual('\u{FE9D}', '\u{FE9E}', '\u{FE9F}', '\u{FEA0}'), // jeem
        '\u{062D}' => Forms::dual('\u{FEA1}', '\u{FEA2}', '\u{FEA3}', '\u{FEA4}'), // hah
        '\u{062E}' => Forms::dual('\u{FEA5}', '\u{FEA6}', '\u{FEA7}', '\u{FEA8}'), // khah
        '\u{062F}' => Forms::right('\u{FEA9}', '\u{FEAA}'),                      // dal
        '\u{0630}' => Forms::right('\u{FEAB}', '\u{FEAC}'),                      // thal
        '\u{0631}' => Forms::right('\u{FEAD}', '\u{FEAE}'),                      // reh
        '\u{0632}' => Forms::right('\u{FEAF}', '\u{FEB0}'),                      // zain
        '\u{0633}' => Forms::dual('\u{FEB1}', '\u{FEB2}', '\u{FEB3}', '\u{FEB4}'), // seen
        '\u{0634}' => Forms::dual('\u{FEB5}', '\u{FEB6}', '\u{FEB7}', '\u{FEB8}'), // sheen
        '\u{0635}' => Forms::dual('\u{FEB9}', '\u{FEBA}', '\u{FEBB}', '\u{FEBC}'), // sad
        '\u{0636}' => Forms::dual('\u{FEBD}', '\u{FEBE}', '\u{FEBF}', '\u{FEC0}'), // dad
        '\u{0637}' => Forms::dual('\u{FEC1}', '\u{FEC2}', '\u{FEC3}', '\u{FEC4}'), // tah
        '\u{0638}' => Forms::dual('\u{FEC5}', '\u{FEC6}', '\u{FEC7}', '\u{FEC8}'), // zah
        '\u{0639}' => Forms::dual('\u{FEC9}', '\u{FECA}', '\u{FECB}', '\u{FECC}'), // ain
        '\u{063A}' => Forms::dual('\u{FECD}', '\u{FECE}', '\u{FECF}', '\u{FED0}'), // ghain
        '\u{0640}' => Forms::dual('\u{0640}', '\u{0640}', '\u{0640}', '\u{0640}'), // tatweel
        '\u{0641}' => Forms::dual('\u{FED1}', '\u{FED2}', '\u{FED3}', '\u{FED4}'), // feh
        '\u{0642}' => Forms::dual('\u{FED5}', '\u{FED6}', '\u{FED7}', '\u{FED8}'), // qaf
        '\u{0643}' => Forms::dual('\u{FED9}', '\u{FEDA}', '\u{FEDB}', '\u{FEDC}'), // kaf
        '\u{0644}' => Forms::dual('\u{FEDD}', '\u{FEDE}', '\u{FEDF}', '\u{FEE0}'), // lam
        '\u{0645}' => Forms::dual('\u{FEE1}', '\u{FEE2}', '\u{FEE3}', '\u{FEE4}'), // meem
        '\u{0646}' => Forms::dual('\u{FEE5}', '\u{FEE6}', '\u{FEE7}', '\u{FEE8}'), // noon
        '\u{0647}' => Forms::dual('\u{FEE9}', '\u{FEEA}', '\u{FEEB}', '\u{FEEC}'), // heh
        '\u{0648}' => Forms::right('\u{FEED}', '\u{FEEE}'),                      // waw
        '\u{0649}' => Forms::right('\u{FEEF}', '\u{FEF0}'),                      // alef maksura
        '\u{064A}' => Forms::dual('\u{FEF1}', '\u{FEF2}', '\u{FEF3}', '\u{FEF4}'), // yeh
        '\u{0679}' => Forms::dual('\u{FB66}', '\u{FB67}', '\u{FB68}', '\u{FB69}'), // tteh
        '\u{067E}' => Forms::dual('\u{FB56}', '\u{FB57}', '\u{FB58}', '\u{FB59}'), // peh
        '\u{0686}' => Forms::dual('\u{FB7A}', '\u{FB7B}', '\u{FB7C}', '\u{FB7D}'), // tcheh
        '\u{0688}' => Forms::right('\u{FB88}', '\u{FB89}'),                      // ddal
        '\u{0691}' => Forms::right('\u{FB8C}', '\u{FB8D}'),                      // rreh
        '\u{0698}' => Forms::right('\u{FB8A}', '\u{FB8B}'),                      // jeh
        '\u{06A9}' => Forms::dual('\u{FB8E}', '\u{FB8F}', '\u{FB90}', '\u{FB91}'), // keheh
        '\u{06AF}' => Forms::dual('\u{FB92}', '\u{FB93}', '\u{FB94}', '\u{FB95}'), // gaf
        '\u{06BA}' => Forms::right('\u{FB9E}', '\u{FB9F}'),                      // noon ghunna
        '\u{06BE}' => Forms::dual('\u{FBAA}', '\u{FBAB}', '\u{FBAC}', '\u{FBAD}'), // heh doachashmee
        '\u{06C1}' => Forms::dual('\u{FBA6}', '\u{FBA7}', '\u{FBA8}', '\u{FBA9}'), // heh goal
        '\u{06CC}' => Forms::dual('\u{FBFC}', '\u{FBFD}', '\u{FBFE}', '\u{FBFF}'), // farsi yeh
        '\u{06D2}' => Forms::right('\u{FBAE}', '\u{FBAF}'),                      // yeh barree
        '\u{06D3}' => Forms::right('\u{FBB0}', '\u{FBB1}'),                      // yeh barree hamza
        _ => return None,
    };
    Some(f)
}

/// Lam-alef ligature forms: (isolated, final) keyed by the alef variant.
fn lam_alef(alef: char) -> Option<(char, char)> {
    match alef {
        '\u{0622}' => Some(('\u{FEF5}', '\u{FEF6}')),
        '\u{0623}' => Some(('\u{FEF7}', '\u{FEF8}')),
        '\u{0625}' => Some(('\u{FEF9}', '\u{FEFA}')),
        '\u{0627}' => Some(('\u{FEFB}', '\u{FEFC}')),
        _ => None,
    }
}

/// Combining marks that are invisible to joining decisions.
fn is_transparent(c: char) -> bool {
    matches!(c, '\u{064B}'..='\u{065F}' | '\u{0670}')
}

/// Replace base Arabic-script letters with their contextual presentation
/// forms. Non-Arabic characters pass through unchanged.
pub fn reshape(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());

    // Whether the previously emitted letter connects to the current one
    let mut prev_joins = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if is_transparent(c) {
            out.push(c);
            i += 1;
            continue;
        }

        let Some(f) = forms(c) else {
            out.push(c);
            prev_joins = false;
            i += 1;
            continue;
        };

        // Lam followed directly by an alef variant fuses into a ligature,
        // which never joins to the following letter
        if c == '\u{0644}' {
            if let Some(&next) = chars.get(i + 1) {
                if let Some((iso, fin)) = lam_alef(next) {
                    out.push(if prev_joins { fin } else { iso });
                    prev_joins = false;
                    i += 2;
                    continue;
                }
            }
        }

        let next_joins = next_letter(&chars, i + 1)
            .and_then(forms)
            .map(|nf| nf.joins_right())
            .unwrap_or(false);

        let shaped = match (prev_joins, next_joins && f.joins_left()) {
            (true, true) => f.medial.unwrap_or(f.isolated),
            (true, false) => f.final_.unwrap_or(f.isolated),
            (false, true) => f.initial.unwrap_or(f.isolated),
            (false, false) => f.isolated,
        };
        out.push(shaped);
        prev_joins = f.joins_left();
        i += 1;
    }

    out
}

/// Next non-transparent character at or after `start`.
fn next_letter(chars: &[char], start: usize) -> Option<char> {
    chars[start..].iter().copied().find(|&c| !is_transparent(c))
}
