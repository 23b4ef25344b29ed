use quick_xml::Reader;
use quick_xml::events::Event;

/// Remove markup tags from an instruction, keeping the text between them verbatim.
///
/// Directions services return instructions such as `Turn <b>right</b> onto Main St`.
/// Entity references are resolved. Input that is not well-formed enough for the XML
/// reader (a bare `<` in text, an unterminated `&`) is stripped by a plain tag scan.
pub fn strip_tags(marked_up: &str) -> String {
    match strip_with_reader(marked_up) {
        Ok(text) => text,
        Err(e) => {
            log::debug!("instruction markup not well-formed ({e}), using plain scan");
            strip_by_scan(marked_up)
        }
    }
}

fn strip_with_reader(marked_up: &str) -> Result<String, quick_xml::Error> {
    let mut reader = Reader::from_str(marked_up);
    // HTML fragments routinely close tags out of order or not at all
    reader.config_mut().check_end_names = false;

    let mut text = String::with_capacity(marked_up.len());
    loop {
        match reader.read_event()? {
            Event::Text(e) => {
                text.push_str(std::str::from_utf8(e.as_ref()).unwrap_or_default());
            }
            Event::CData(e) => {
                text.push_str(std::str::from_utf8(e.as_ref()).unwrap_or_default());
            }
            Event::GeneralRef(e) => {
                if let Ok(Some(ch)) = e.resolve_char_ref() {
                    text.push(ch);
                } else {
                    let name = std::str::from_utf8(e.as_ref()).unwrap_or_default();
                    match name {
                        "amp" => text.push('&'),
                        "lt" => text.push('<'),
                        "gt" => text.push('>'),
                        "quot" => text.push('"'),
                        "apos" => text.push('\''),
                        "nbsp" => text.push(' '),
                        other => {
                            text.push('&');
                            text.push_str(other);
                            text.push(';');
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(text)
}

fn strip_by_scan(marked_up: &str) -> String {
    let mut text = String::with_capacity(marked_up.len());
    let mut in_tag = false;
    for ch in marked_up.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }
    text
}
