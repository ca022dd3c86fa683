//! Instruction text sent with every classify batch.

/// Builds the instruction for a batch of ad descriptions.
///
/// The descriptions are embedded as a JSON array so quoting and newlines
/// inside an ad cannot break the list structure.
pub(crate) fn build_prompt(descriptions_json: &str) -> String {
    format!(
        "Hieronder staat een lijst met advertentiebeschrijvingen in het Nederlands. \
         Bepaal voor iedere beschrijving het belangrijkste merk van het aangeboden product. \
         Noem daarnaast de producttitel als die duidelijk herkenbaar is. \
         Gebruik 'Onbekend' wanneer merk of titel niet te bepalen is. \
         Antwoord met een JSON-lijst van strings, precies één per beschrijving en in \
         dezelfde volgorde, elk in het formaat 'Merk: [merk], Titel: [titel]'.\n\n\
         Beschrijvingen (JSON-lijst):\n{descriptions_json}\n\n\
         Voorbeeld van het verwachte antwoord:\n\
         [\n \"Merk: Ubiquiti, Titel: UniFi U6 Lite\",\n \
         \"Merk: TP-Link, Titel: EAP225\",\n \
         \"Merk: Onbekend, Titel: Onbekend\"\n]"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_descriptions_verbatim() {
        let prompt = build_prompt(r#"["Oud Trek fietsje"]"#);
        assert!(prompt.contains(r#"["Oud Trek fietsje"]"#));
        assert!(prompt.contains("Merk: [merk], Titel: [titel]"));
        assert!(prompt.contains("Onbekend"));
    }
}
