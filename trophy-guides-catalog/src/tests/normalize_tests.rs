use super::*;

#[test]
fn trademark_colon_and_apostrophe() {
    assert_eq!(
        normalize_key("Marvel's Spider-Man™: Remastered"),
        "marvels spider man remastered"
    );
}

#[test]
fn slug_with_leading_the_and_platform_suffix() {
    assert_eq!(normalize_key("the-last-of-us-part-ii-ps4"), "last of us part ii");
    assert_eq!(normalize_key("last-of-us-part-ii"), "last of us part ii");
}

#[test]
fn parenthesised_platform_tag() {
    assert_eq!(normalize_key("God of War Ragnarok (PS5)"), "god of war ragnarok");
}

#[test]
fn ascii_folding() {
    assert_eq!(normalize_key("God of War Ragnarök"), "god of war ragnarok");
    assert_eq!(normalize_key("Pokémon Café"), "pokemon cafe");
}

#[test]
fn html_entities_are_decoded() {
    assert_eq!(normalize_key("Ratchet &amp; Clank"), "ratchet clank");
    assert_eq!(normalize_key("Assassin&#39;s Creed"), "assassins creed");
    assert_eq!(normalize_key("Uncharted&trade; 4"), "uncharted 4");
}

#[test]
fn malformed_entities_are_left_alone() {
    assert_eq!(normalize_key("Ratchet & Clank"), "ratchet clank");
    assert_eq!(normalize_key("A &bogus; title"), "a bogus title");
}

#[test]
fn curly_quotes_are_straightened_and_dropped() {
    assert_eq!(normalize_key("Tom Clancy’s The Division"), "tom clancys the division");
    assert_eq!(normalize_key("“Quoted” Game"), "quoted game");
}

#[test]
fn spelled_out_marks() {
    assert_eq!(normalize_key("Crash Bandicoot(TM) N. Sane"), "crash bandicoot n sane");
    assert_eq!(normalize_key("Tetris(R) Effect"), "tetris effect");
}

#[test]
fn dashes_and_em_dashes_collapse() {
    assert_eq!(normalize_key("Spider-Man — Miles Morales"), "spider man miles morales");
    assert_eq!(normalize_key("Nier:Automata"), "nier automata");
    assert_eq!(normalize_key("a   b---c__d"), "a b c d");
}

#[test]
fn stacked_suffixes_are_all_removed() {
    assert_eq!(normalize_key("horizon-zero-dawn-ps4-ps5"), "horizon zero dawn");
    assert_eq!(
        normalize_key("Ghost of Tsushima Digital Deluxe Edition PS5"),
        "ghost of tsushima"
    );
    assert_eq!(normalize_key("Persona 4 Golden (PS Vita)"), "persona 4 golden");
}

#[test]
fn suffix_only_stripped_at_end() {
    assert_eq!(normalize_key("PS4 Remote Play Party"), "ps4 remote play party");
    assert_eq!(normalize_key("The Vita Collection"), "vita collection");
}

#[test]
fn never_strips_to_empty() {
    assert_eq!(normalize_key("The"), "the");
    assert_eq!(normalize_key("PS4"), "ps4");
    assert_eq!(normalize_key("the-ps4"), "the");
    assert_eq!(normalize_key(""), "");
    assert_eq!(normalize_key("™ ®"), "");
}

#[test]
fn leading_the_only() {
    assert_eq!(normalize_key("The Witcher 3"), "witcher 3");
    assert_eq!(normalize_key("Of the Abyss"), "of the abyss");
}

#[test]
fn normalize_is_idempotent() {
    let inputs = [
        "Marvel's Spider-Man™: Remastered",
        "the-last-of-us-part-ii-ps4",
        "The The PS4",
        "&amp;amp; double encoded",
        "God of War Ragnarök (PS5) — Digital Deluxe Edition",
        "Final Fantasy VII Remake Intergrade",
        "  spaced   out  ",
        "the-ps4",
        "“Quoted” Game (TM)",
        "ゼルダの伝説",
        "",
    ];
    for input in inputs {
        let once = normalize_key(input);
        assert_eq!(normalize_key(&once), once, "not idempotent for {input:?}");
    }
}

#[test]
fn normalize_is_deterministic() {
    let a = normalize_key("Uncharted: The Lost Legacy");
    let b = normalize_key("Uncharted: The Lost Legacy");
    assert_eq!(a, b);
    assert_eq!(a, "uncharted the lost legacy");
}
