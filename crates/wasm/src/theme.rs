use folio_protocol::ThemeToken;

/// CSS color for a token. Opacity travels separately on each command and is
/// applied through the context's global alpha.
pub fn css_color(token: ThemeToken) -> &'static str {
    match token {
        ThemeToken::Background => "#0a0e14",
        ThemeToken::NodeFill | ThemeToken::ConnectionStroke => "rgb(74, 158, 255)",
        ThemeToken::MatrixGlyph => "#00ff00",
        ThemeToken::MatrixFade => "#000000",
        ThemeToken::CapsuleFill | ThemeToken::StationGlow => "#2D8CFF",
    }
}

/// Drop-shadow filter used for glowing SVG elements.
pub fn glow_filter(token: ThemeToken, blur_px: f64) -> String {
    format!("drop-shadow(0 0 {blur_px}px {})", css_color(token))
}
