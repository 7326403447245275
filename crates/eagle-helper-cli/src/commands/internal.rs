use super::{json_pretty, spin_fail, spin_ok, spinner, EXIT_FAILURE, EXIT_SUCCESS};
use eagle_helper_core::I18n;
use eagle_helper_remote::{HttpTranslator, TranslatorConfig};

/// Dump every string resolved so far in this process, keyed by catalog key.
pub fn i18ncache(i18n: &I18n, json: bool) -> Result<u8, String> {
    if json {
        let payload = serde_json::json!({
            "language": i18n.language(),
            "translator": i18n.has_translator(),
            "cache": i18n.cache(),
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("{}", json_pretty(i18n.cache())?);
    }
    Ok(EXIT_SUCCESS)
}

pub fn translate(
    config: &TranslatorConfig,
    text: &str,
    to: &str,
    from: &str,
    json: bool,
) -> Result<u8, String> {
    let translator = HttpTranslator::new(config.clone());
    let pb = spinner(&format!("translating {from} -> {to}"));
    match translator.help_me_translate(text, to, from) {
        Ok(translated) => {
            spin_ok(&pb, "translated");
            if json {
                let payload = serde_json::json!({
                    "source": from,
                    "target": to,
                    "text": text,
                    "translation": translated,
                });
                println!("{}", json_pretty(&payload)?);
            } else {
                println!("{translated}");
            }
            Ok(EXIT_SUCCESS)
        }
        Err(e) => {
            spin_fail(&pb, "translation failed");
            if json {
                let payload = serde_json::json!({
                    "source": from,
                    "target": to,
                    "error": e.to_string(),
                });
                println!("{}", json_pretty(&payload)?);
                Ok(EXIT_FAILURE)
            } else {
                Err(format!("translation error: {e}"))
            }
        }
    }
}
