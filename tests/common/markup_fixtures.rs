/// Prose with headings, nested color and size scopes, escapes, and breaks.
pub fn styled_document(paragraphs: usize) -> String {
    let mut out = String::with_capacity(paragraphs * 256);
    for idx in 0..paragraphs {
        out.push_str("[s=1.5 fg=#223344]Chapter ");
        out.push_str(&idx.to_string());
        out.push_str("[/]\n");
        out.push_str("Plain words fill the line until the wrapper has to break it. ");
        out.push_str("[fg=red]Red [bg=yellow]highlighted[/] text[/] then ");
        out.push_str("[a=0.5]faded [s=0.8]small print[/][/] and [[escaped]] brackets. ");
        out.push_str("[fg=navy s=1.2]Nested [fg=green a=0.7]scopes[/] close[/] cleanly.\n\n");
    }
    out
}

/// Plain text with no tags or escapes.
pub fn plain_document(words: usize) -> String {
    let vocabulary = ["lorem", "ipsum", "dolor", "sit", "amet", "consectetur"];
    let mut out = String::with_capacity(words * 8);
    for idx in 0..words {
        if idx > 0 {
            out.push(if idx % 17 == 0 { '\n' } else { ' ' });
        }
        out.push_str(vocabulary[idx % vocabulary.len()]);
    }
    out
}

/// Hostile inputs: unbalanced scopes, malformed tags, stray brackets.
pub fn adversarial_inputs() -> Vec<String> {
    let mut out = vec![
        String::new(),
        "[".to_string(),
        "]".to_string(),
        "[/".to_string(),
        "[fg=".to_string(),
        "[fg=red".to_string(),
        "[fg=red]".to_string(),
        "[/][/][/]text".to_string(),
        "[[[[]]]]".to_string(),
        "[]".to_string(),
        "[ fg=red]x".to_string(),
        "[fg=red  s=2]x".to_string(),
        "[fg = red]x".to_string(),
        "[s=NaN]x[/][s=inf]y[/][s=-1]z[/][s=0]w".to_string(),
        "[a=nan]x[/][a=-5]y[/][a=1e9]z".to_string(),
        "\n\n\n".to_string(),
        "   ".to_string(),
        "\t\u{00A0}\u{2003}".to_string(),
        "emoji 🙂 [fg=red]色[/] ünïcödé".to_string(),
        "word[fg=red]glued[/]word".to_string(),
    ];
    out.push("[s=2]".repeat(64) + "deep" + &"[/]".repeat(64));
    out.push("[/]".repeat(200) + "after");
    out.push("x".repeat(5000));
    out.push("[fg=red]".repeat(300) + "unclosed");
    out.push("] [ ]] [[ [/ [x=1] [fg] [fg=] ".repeat(50));
    out
}
