use crate::config::STYLING_PROMPT_TEMPLATE;
use crate::styling::StylingRequestContext;

/// Substitutes `{name}` placeholders in one pass; inserted values are never rescanned.
fn fill_placeholders(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let matched = tail.find('}').and_then(|end| {
            let name = &tail[1..end];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (end, *value))
        });
        match matched {
            Some((end, value)) => {
                out.push_str(value);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn build_prompt(context: &StylingRequestContext) -> String {
    fill_placeholders(
        STYLING_PROMPT_TEMPLATE,
        &[
            ("gender", context.gender.trim()),
            ("skin_tone", context.skin_tone.as_str()),
            ("occasion", context.occasion.trim()),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ToneCategory;

    #[test]
    fn interpolates_context_values() {
        let prompt = build_prompt(&StylingRequestContext {
            skin_tone: ToneCategory::Olive,
            gender: " Male ".to_string(),
            occasion: "Wedding".to_string(),
        });

        assert!(prompt.contains("A Male user with a 'Olive' skin tone"));
        assert!(prompt.contains("for a 'Wedding' occasion"));
        for placeholder in ["{gender}", "{skin_tone}", "{occasion}"] {
            assert!(!prompt.contains(placeholder));
        }
    }

    #[test]
    fn placeholder_text_in_values_is_inserted_verbatim() {
        let prompt = build_prompt(&StylingRequestContext {
            skin_tone: ToneCategory::Deep,
            gender: "{occasion}".to_string(),
            occasion: "{gender} {skin_tone}".to_string(),
        });

        assert!(prompt.contains("A {occasion} user with a 'Deep' skin tone"));
        assert!(prompt.contains("for a '{gender} {skin_tone}' occasion"));
    }

    #[test]
    fn unknown_braces_are_left_alone() {
        let filled = fill_placeholders("{a} {b} {unclosed", &[("a", "x")]);
        assert_eq!(filled, "x {b} {unclosed");
        assert_eq!(fill_placeholders("{{a}}", &[("a", "1")]), "{1}");
    }

    #[test]
    fn lists_every_required_key() {
        let prompt = build_prompt(&StylingRequestContext {
            skin_tone: ToneCategory::Fair,
            gender: "Female".to_string(),
            occasion: "Casual".to_string(),
        });

        for key in [
            "\"outfit_description\"",
            "\"shopping_terms\"",
            "\"color_palette\"",
            "\"primary\"",
            "\"secondary\"",
            "\"accent\"",
            "\"accessories\"",
            "\"hairstyle\"",
            "\"why_it_works\"",
        ] {
            assert!(prompt.contains(key), "missing {key}");
        }
        assert!(prompt.ends_with("Return ONLY valid JSON. Do not include introductory text or markdown tags."));
    }
}
