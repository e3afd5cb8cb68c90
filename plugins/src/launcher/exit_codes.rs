/// Meaning of a TLC process exit code, if TLC assigns one.
pub fn describe_tlc_exit(code: i32) -> Option<&'static str> {
    let text = match code {
        0 => "success",
        10 => "assumption violation",
        11 => "deadlock reached",
        12 => "safety violation",
        13 => "liveness violation",
        14 => "assertion violation",
        150 => "specification parse error",
        151 => "configuration parse error",
        152 => "state space too large",
        153 => "system error",
        255 => "general error",
        _ => return None,
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_have_descriptions() {
        assert_eq!(describe_tlc_exit(12), Some("safety violation"));
        assert_eq!(describe_tlc_exit(150), Some("specification parse error"));
        assert_eq!(describe_tlc_exit(137), None);
    }
}
