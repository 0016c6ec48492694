//! Decoding of the `{ ... }` register clause of invoke-style instructions
//!
//! Registers are listed either explicitly (`{v0, v1, p2}`) or with the range shorthand that names
//! only the first and last register of a contiguous run (`{v3 .. v6}`).

use super::FormatError;

/// Separator between the bounds of a register range
pub const RANGE_SEPARATOR: &str = "..";

/// Ordered register tokens of one instruction
pub type ArgumentList = Vec<String>;

/// Extract and decode the register clause of an instruction line
///
/// Only the first `{ ... }` on the line is considered.
pub fn method_arguments(line: &str) -> Result<ArgumentList, FormatError> {
    let clause = line
        .find('{')
        .and_then(|start| {
            let rest = &line[start + 1..];
            rest.find('}').map(|end| &rest[..end])
        })
        .ok_or_else(|| FormatError::MissingArgumentClause(line.to_owned()))?;
    decode_arguments(clause)
}

/// Decode the text between `{` and `}` into explicit register tokens
///
/// A range whose start index exceeds its end index decodes to no registers at all.
pub fn decode_arguments(clause: &str) -> Result<ArgumentList, FormatError> {
    match clause.split_once(RANGE_SEPARATOR) {
        None => Ok(clause.split(',').map(|arg| arg.trim().to_owned()).collect()),
        Some((start, end)) => {
            let (start, end) = (start.trim(), end.trim());
            let (prefix, first) = split_register(start)?;
            let (end_prefix, last) = split_register(end)?;
            if prefix != end_prefix {
                return Err(FormatError::MismatchedRangePrefix {
                    start: start.to_owned(),
                    end: end.to_owned(),
                });
            }
            Ok((first..=last)
                .map(|index| format!("{}{}", prefix, index))
                .collect())
        }
    }
}

/// Register class of a token (`v` for locals, `p` for parameters)
pub fn register_class(register: &str) -> Option<char> {
    register.chars().next()
}

/// Render a register range in shorthand form
pub fn render_range(first: &str, last: &str) -> String {
    format!("{{{} {} {}}}", first, RANGE_SEPARATOR, last)
}

/// Render an explicit register list
pub fn render_list<S: AsRef<str>>(registers: &[S]) -> String {
    let registers: Vec<&str> = registers.iter().map(AsRef::as_ref).collect();
    format!("{{{}}}", registers.join(", "))
}

fn split_register(register: &str) -> Result<(char, u16), FormatError> {
    let prefix =
        register_class(register).ok_or_else(|| FormatError::BadRegisterIndex(register.to_owned()))?;
    let index = register[prefix.len_utf8()..]
        .parse::<u16>()
        .map_err(|_| FormatError::BadRegisterIndex(register.to_owned()))?;
    Ok((prefix, index))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn explicit_lists() {
        assert_eq!(decode_arguments("a, b , c").unwrap(), vec!["a", "b", "c"]);
        assert_eq!(decode_arguments("v0").unwrap(), vec!["v0"]);
        assert_eq!(decode_arguments("").unwrap(), vec![""]);
        assert_eq!(decode_arguments(" p1,v2,  v10 ").unwrap(), vec!["p1", "v2", "v10"]);
    }

    #[test]
    fn ranges() {
        assert_eq!(
            decode_arguments("v0 .. v3").unwrap(),
            vec!["v0", "v1", "v2", "v3"]
        );
        assert_eq!(decode_arguments("p0 .. p0").unwrap(), vec!["p0"]);
        assert_eq!(decode_arguments("v9..v11").unwrap(), vec!["v9", "v10", "v11"]);
        assert_eq!(decode_arguments("v5 .. v2").unwrap(), Vec::<String>::new());

        let decoded = decode_arguments("v17 .. v40").unwrap();
        assert_eq!(decoded.len(), 24);
        assert_eq!(decoded.first().map(String::as_str), Some("v17"));
        assert_eq!(decoded.last().map(String::as_str), Some("v40"));
    }

    #[test]
    fn malformed_ranges() {
        assert_eq!(
            decode_arguments("v0 .. p3"),
            Err(FormatError::MismatchedRangePrefix {
                start: String::from("v0"),
                end: String::from("p3"),
            })
        );
        assert_eq!(
            decode_arguments("v0 .. vx"),
            Err(FormatError::BadRegisterIndex(String::from("vx")))
        );
        assert_eq!(
            decode_arguments("v0 .. v4000000000"),
            Err(FormatError::BadRegisterIndex(String::from("v4000000000")))
        );
        assert_eq!(
            decode_arguments("v0 .. v65536"),
            Err(FormatError::BadRegisterIndex(String::from("v65536")))
        );
        assert_eq!(decode_arguments("v65535 .. v65535").unwrap(), vec!["v65535"]);
        assert_eq!(
            decode_arguments(" .. v2"),
            Err(FormatError::BadRegisterIndex(String::new()))
        );
    }

    #[test]
    fn instruction_lines() {
        let line = "    invoke-interface/range {v2 .. v6}, Landroid/app/IApplicationThread;->scheduleResumeActivity(Landroid/os/IBinder;IZLandroid/os/Bundle;)V\n";
        assert_eq!(
            method_arguments(line).unwrap(),
            vec!["v2", "v3", "v4", "v5", "v6"]
        );

        let line = "    invoke-virtual {v0, p1}, Landroid/util/ArraySet;->contains(Ljava/lang/Object;)Z";
        assert_eq!(method_arguments(line).unwrap(), vec!["v0", "p1"]);

        assert!(matches!(
            method_arguments("    return-void"),
            Err(FormatError::MissingArgumentClause(_))
        ));
    }

    #[test]
    fn rendering() {
        assert_eq!(render_range("v3", "v3"), "{v3 .. v3}");
        assert_eq!(render_list(&["v1", "p2", "v4"]), "{v1, p2, v4}");
        assert_eq!(register_class("p7"), Some('p'));
        assert_eq!(register_class(""), None);
    }
}
