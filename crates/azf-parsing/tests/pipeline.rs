use azf_parsing::normalize::normalize;
use azf_parsing::{Letter, QuestionExtractor, RawDocument, SkipCause};

fn catalogue() -> RawDocument {
    RawDocument::Pages(vec![
        "\
Prüfungsfragen im Prüfungsteil Kenntnisse / Allgemeinwissen
Seite / page 1 von / of 2
Hinweis: Die Reihenfolge der Antworten wird im Test gemischt.
1 Was bedeutet die Abkürzung QNH?
A Luftdruck auf Meereshöhe reduziert
B Luftdruck am Platz
C Temperatur am Platz
D Taupunkt
2 Welche Angabe ist bei einem Notruf
zuerst zu übermitteln?
A MAYDAY, dreimal gesprochen
B Die Position des Luftfahrzeugs
C Der Name des
Luftfahrzeugführers
D Die Uhrzeit
3 What is FLIGHT LEVEL? A Answer one B Answer two C Answer three
richtige Antwort immer A / correct answer always A
Stand / As at:: 01.02.2024"
            .to_string(),
        "\
Prüfungsfragen im Prüfungsteil Kenntnisse / Allgemeinwissen
Seite / page 2 von / of 2
4 Wie lange ist ein Sprechfunkzeugnis gültig?
A Unbegrenzt
B 5 Jahre
C 10 Jahre
D 2 Jahre
6 In welchem Luftraum ist eine Freigabe erforderlich?
A Luftraum C
B Luftraum G
C Luftraum E bei Tag
D Luftraum F
E
Stand / As at:: 01.02.2024"
            .to_string(),
    ])
}

#[test]
fn test_every_id_accounted_for() -> anyhow::Result<()> {
    let result = QuestionExtractor::new().extract(&catalogue(), 6)?;

    assert!(result.is_complete());
    let accepted: Vec<u32> = result.accepted.iter().map(|q| q.id).collect();
    assert_eq!(accepted, vec![1, 2, 4, 6]);
    assert_eq!(result.missing_ids(), vec![3, 5]);
    assert!(result.accepted.iter().all(|q| q.is_well_formed()));
    Ok(())
}

#[test]
fn test_inline_question_with_three_answers_is_diagnosed() -> anyhow::Result<()> {
    let result = QuestionExtractor::new().extract(&catalogue(), 6)?;

    let skip = result
        .skipped
        .iter()
        .find(|s| s.id == 3)
        .expect("question 3 skipped");
    assert_eq!(skip.causes, vec![SkipCause::WrongAnswerCount { found: 3 }]);
    assert!(skip.has_question_text);
    assert_eq!(
        skip.letters_found.iter().copied().collect::<Vec<_>>(),
        vec![Letter::A, Letter::B, Letter::C]
    );
    assert!(skip.preview.starts_with("What is FLIGHT LEVEL?"));

    let missing = result.skipped.iter().find(|s| s.id == 5).expect("5 skipped");
    assert_eq!(missing.causes, vec![SkipCause::NotFound]);
    Ok(())
}

#[test]
fn test_wrapped_text_and_footers() -> anyhow::Result<()> {
    let result = QuestionExtractor::new().extract(&catalogue(), 6)?;

    let q2 = &result.accepted[1];
    assert_eq!(
        q2.text,
        "Welche Angabe ist bei einem Notruf zuerst zu übermitteln?"
    );
    assert_eq!(q2.answers[2].text, "Der Name des Luftfahrzeugführers");
    assert_eq!(q2.correct_answer().map(|a| a.text.as_str()), Some("MAYDAY, dreimal gesprochen"));

    // Footer text never leaks into a stored question.
    for q in &result.accepted {
        assert!(!q.text.contains("Stand"));
        for a in &q.answers {
            assert!(!a.text.contains("Stand / As at"), "{}", a.text);
            assert!(!a.text.contains("Seite / page"), "{}", a.text);
        }
    }

    let q6 = result.accepted.iter().find(|q| q.id == 6).expect("6 accepted");
    assert_eq!(q6.answers[0].text, "Luftraum C");
    assert_eq!(q6.answers[3].text, "Luftraum F E");
    Ok(())
}

#[test]
fn test_runs_are_deterministic() -> anyhow::Result<()> {
    let extractor = QuestionExtractor::new();
    let first = extractor.extract(&catalogue(), 6)?;
    let second = extractor.extract(&catalogue(), 6)?;
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first.accepted)?,
        serde_json::to_string(&second.accepted)?
    );
    Ok(())
}

#[test]
fn test_normalize_is_idempotent_on_catalogue() {
    let text = catalogue().joined_text().into_owned();
    let once = normalize(&text);
    assert_eq!(normalize(&once), once);
    assert!(!once.contains("Stand / As at::"));
    assert!(!once.contains("Prüfungsfragen im Prüfungsteil"));
}

#[test]
fn test_answer_wrapped_across_page_break() -> anyhow::Result<()> {
    let document = RawDocument::Pages(vec![
        "\
1 Was bedeutet die Abkürzung QNH?
A Luftdruck auf
richtige Antwort immer A / correct answer always A
Stand / As at:: 01.02.2024"
            .to_string(),
        "\
Prüfungsfragen im Prüfungsteil Kenntnisse / Allgemeinwissen
Seite / page 2 von / of 2
Meereshöhe reduziert
B Luftdruck am Platz
C Temperatur am Platz
D Taupunkt"
            .to_string(),
    ]);
    let result = QuestionExtractor::new().extract(&document, 1)?;

    assert_eq!(result.accepted.len(), 1);
    let answers: Vec<&str> = result.accepted[0]
        .answers
        .iter()
        .map(|a| a.text.as_str())
        .collect();
    assert_eq!(
        answers,
        vec![
            "Luftdruck auf Meereshöhe reduziert",
            "Luftdruck am Platz",
            "Temperatur am Platz",
            "Taupunkt"
        ]
    );
    Ok(())
}

#[test]
fn test_number_inside_wrapped_answer_does_not_split_question() -> anyhow::Result<()> {
    let document = RawDocument::from(
        "\
4 Wie lange ist ein Sprechfunkzeugnis gültig?
A Unbegrenzt, sofern nach
5 Jahren eine Auffrischung erfolgt
B Zwei Jahre
C Zehn Jahre
D Drei Jahre
5 Welche Farbe hat das linke Positionslicht?
A Rot
B Grün
C Weiß
D Blau",
    );
    let result = QuestionExtractor::new().extract(&document, 5)?;

    assert!(result.is_complete());
    let accepted: Vec<u32> = result.accepted.iter().map(|q| q.id).collect();
    assert_eq!(accepted, vec![4, 5]);
    assert_eq!(
        result.accepted[0].answers[0].text,
        "Unbegrenzt, sofern nach 5 Jahren eine Auffrischung erfolgt"
    );
    assert_eq!(result.accepted[0].answers[3].text, "Drei Jahre");
    assert_eq!(
        result.accepted[1].text,
        "Welche Farbe hat das linke Positionslicht?"
    );
    assert_eq!(result.missing_ids(), vec![1, 2, 3]);
    Ok(())
}

#[test]
fn test_question_numbers_in_their_own_cells() -> anyhow::Result<()> {
    let document = RawDocument::from(
        "\
1
Was bedeutet die Abkürzung QNH?
A Luftdruck auf Meereshöhe reduziert
B Luftdruck am Platz
C Temperatur am Platz
D Taupunkt
2
Welche Farbe hat das linke Positionslicht?
A Rot
B Grün
C Weiß
D Blau",
    );
    let result = QuestionExtractor::new().extract(&document, 2)?;

    assert!(result.skipped.is_empty(), "{:?}", result.skipped);
    assert_eq!(result.accepted[0].text, "Was bedeutet die Abkürzung QNH?");
    assert_eq!(result.accepted[1].answers[0].text, "Rot");
    Ok(())
}
