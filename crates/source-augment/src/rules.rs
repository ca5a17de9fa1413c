/// How the raw words of one argument are rendered, selected by base type name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeRule {
    /// Interface value; only tagged
    Error,
    Float32,
    Float64,
    /// Signed integer of the given bit width
    Signed(u32),
    /// Unsigned integer of the given bit width
    Unsigned(u32),
    /// Pointer word followed by a length word
    String,
    /// Anything else: the word in hex, tagged with the type name
    Opaque,
}

impl TypeRule {
    /// Select the rule for a base type name
    ///
    /// `int` and `uint` are word sized (64 bits).
    #[must_use]
    pub fn for_name(name: &str) -> Self {
        match name {
            "error" => Self::Error,
            "float32" => Self::Float32,
            "float64" => Self::Float64,
            "int" | "int64" => Self::Signed(64),
            "int32" | "rune" => Self::Signed(32),
            "int16" => Self::Signed(16),
            "int8" => Self::Signed(8),
            "uint" | "uint64" | "uintptr" => Self::Unsigned(64),
            "uint32" => Self::Unsigned(32),
            "uint16" => Self::Unsigned(16),
            "uint8" | "byte" => Self::Unsigned(8),
            "string" => Self::String,
            _ => Self::Opaque,
        }
    }

    /// Number of raw words the rule consumes
    #[must_use]
    pub const fn words(self) -> usize {
        match self {
            Self::String => 2,
            _ => 1,
        }
    }

    /// Render `words` (exactly [`Self::words`] of them) for type `name`
    #[must_use]
    pub fn format(self, name: &str, words: &[u64]) -> String {
        let word = words.first().copied().unwrap_or_default();
        match self {
            Self::Error => "error".to_string(),
            Self::Float32 => {
                let value = f32::from_bits(word as u32);
                format_g(f64::from(value), &format!("{value:e}"), || value.to_string())
            }
            Self::Float64 => {
                let value = f64::from_bits(word);
                format_g(value, &format!("{value:e}"), || value.to_string())
            }
            Self::Signed(bits) => {
                let shift = 64 - bits;
                (((word << shift) as i64) >> shift).to_string()
            }
            Self::Unsigned(bits) => {
                let shift = 64 - bits;
                ((word << shift) >> shift).to_string()
            }
            Self::String => {
                let len = words.get(1).copied().unwrap_or_default();
                format!("{name}(0x{word:x}, {len})")
            }
            Self::Opaque => format!("{name}(0x{word:x})"),
        }
    }
}

/// Shortest-digit `%g` rendering: exponent form below 1e-4 or from 1e6 up
///
/// `scientific` is the `{:e}` rendering of the value at its own precision and
/// `plain` its `Display` rendering; both are shortest round-trip.
fn format_g(value: f64, scientific: &str, plain: impl FnOnce() -> String) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "+Inf" } else { "-Inf" }.to_string();
    }

    let Some((mantissa, exp)) = scientific.split_once('e') else {
        return plain();
    };
    let Ok(exp) = exp.parse::<i32>() else {
        return plain();
    };
    if value == 0.0 || (-4..6).contains(&exp) {
        return plain();
    }

    let sign = if exp < 0 { '-' } else { '+' };
    format!("{mantissa}e{sign}{:02}", exp.unsigned_abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(name: &str, words: &[u64]) -> String {
        TypeRule::for_name(name).format(name, words)
    }

    #[test]
    fn test_integers() {
        assert_eq!(render("int", &[0x1]), "1");
        assert_eq!(render("int", &[u64::MAX]), "-1");
        assert_eq!(render("int8", &[0xff]), "-1");
        assert_eq!(render("int8", &[0x17f]), "127");
        assert_eq!(render("int32", &[0xffff_fffe]), "-2");
        assert_eq!(render("uint8", &[0x1ff]), "255");
        assert_eq!(render("uint16", &[0x1_0001]), "1");
        assert_eq!(render("uint", &[u64::MAX]), "18446744073709551615");
        assert_eq!(render("byte", &[0x41]), "65");
    }

    #[test]
    fn test_floats() {
        assert_eq!(render("float32", &[u64::from(3.5f32.to_bits())]), "3.5");
        assert_eq!(render("float32", &[0xdead_0000_0000_0000 | u64::from(0.1f32.to_bits())]), "0.1");
        assert_eq!(render("float64", &[2.25f64.to_bits()]), "2.25");
        assert_eq!(render("float64", &[0.1f64.to_bits()]), "0.1");
        assert_eq!(render("float64", &[(-0.0f64).to_bits()]), "-0");
    }

    #[test]
    fn test_floats_switch_to_exponent_form() {
        assert_eq!(render("float64", &[1e21f64.to_bits()]), "1e+21");
        assert_eq!(render("float64", &[1e6f64.to_bits()]), "1e+06");
        assert_eq!(render("float64", &[123456.0f64.to_bits()]), "123456");
        assert_eq!(render("float64", &[1234567.0f64.to_bits()]), "1.234567e+06");
        assert_eq!(render("float64", &[0.0001f64.to_bits()]), "0.0001");
        assert_eq!(render("float64", &[0.00001f64.to_bits()]), "1e-05");
        assert_eq!(render("float64", &[(-2.5e-7f64).to_bits()]), "-2.5e-07");
        assert_eq!(render("float32", &[u64::from(1e10f32.to_bits())]), "1e+10");
    }

    #[test]
    fn test_denormal_floats_stay_short() {
        assert_eq!(render("float64", &[0x1]), "5e-324");
        assert_eq!(render("float32", &[0x1]), "1e-45");

        // A pointer word read as float64
        let pointer = render("float64", &[0xc000010000]);
        assert!(pointer.ends_with("e-312"), "{pointer}");
        assert!(pointer.len() < 32, "{pointer}");
    }

    #[test]
    fn test_special_floats() {
        assert_eq!(render("float64", &[f64::INFINITY.to_bits()]), "+Inf");
        assert_eq!(render("float64", &[f64::NEG_INFINITY.to_bits()]), "-Inf");
        assert_eq!(render("float64", &[f64::NAN.to_bits()]), "NaN");
        assert_eq!(render("float32", &[u64::from(f32::INFINITY.to_bits())]), "+Inf");
        assert_eq!(render("float32", &[u64::from(f32::NEG_INFINITY.to_bits())]), "-Inf");
        assert_eq!(render("float64", &[0.0f64.to_bits()]), "0");
    }

    #[test]
    fn test_string_consumes_two_words() {
        assert_eq!(TypeRule::String.words(), 2);
        assert_eq!(render("string", &[0x43080, 0x3]), "string(0x43080, 3)");
    }

    #[test]
    fn test_error_and_opaque() {
        assert_eq!(render("error", &[0xc000010000]), "error");
        assert_eq!(render("Foo", &[0xc000010000]), "Foo(0xc000010000)");
        assert_eq!(TypeRule::for_name("Foo"), TypeRule::Opaque);
        assert_eq!(TypeRule::for_name("Foo").words(), 1);
    }
}
