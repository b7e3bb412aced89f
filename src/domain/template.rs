use super::Event;

/// Substitutes `%platform%`, `%username%`, `%amount%`, `%formatted_amount%` and `%message%`
/// with the matching event field.
///
/// Substituted text is never scanned again, so a username containing `%message%` stays literal.
/// Unknown `%name%` sequences are copied through untouched.
pub fn render(template: &str, event: &Event) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('%') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        let Some(end) = after.find('%') else {
            out.push_str(&rest[start..]);
            return out;
        };

        match field(&after[..end], event) {
            Some(value) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                // keep the closing '%' in play, it may open a real placeholder
                out.push('%');
                out.push_str(&after[..end]);
                rest = &after[end..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn field<'a>(name: &str, event: &'a Event) -> Option<&'a str> {
    match name {
        "platform" => Some(&event.platform),
        "username" => Some(&event.username),
        "amount" => Some(&event.amount),
        "formatted_amount" => Some(&event.formatted_amount),
        "message" => Some(&event.message),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event() -> Event {
        Event {
            event_key: "streamlabs_donation".into(),
            platform: "streamlabs".into(),
            username: "Bob".into(),
            amount: "5.00".into(),
            formatted_amount: "$5.00".into(),
            message: "hello".into(),
        }
    }

    #[test]
    fn substitutes_every_known_placeholder() {
        let out = render(
            "%platform%/%username%/%amount%/%formatted_amount%/%message%",
            &event(),
        );
        assert_eq!(out, "streamlabs/Bob/5.00/$5.00/hello");
    }

    #[test]
    fn repeated_placeholders_are_all_replaced() {
        assert_eq!(render("%username% %username%", &event()), "Bob Bob");
    }

    #[test]
    fn unknown_placeholders_stay_literal() {
        assert_eq!(render("give %player% diamond", &event()), "give %player% diamond");
        assert_eq!(render("100% of %username%", &event()), "100% of Bob");
        assert_eq!(render("%foo%username%", &event()), "%fooBob");
        assert_eq!(render("trailing %", &event()), "trailing %");
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let mut e = event();
        e.username = "%message%".into();
        assert_eq!(render("hi %username%", &e), "hi %message%");
    }

    #[test]
    fn rendering_without_placeholders_is_idempotent() {
        let e = event();
        for x in ["plain text", "50% off", "%nope% and %also_nope%", ""] {
            let once = render(x, &e);
            assert_eq!(render(&once, &e), once);
            assert_eq!(once, x);
        }
    }
}
