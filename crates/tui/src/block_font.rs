use std::collections::HashMap;

use once_cell::sync::Lazy;

const FONT_HEIGHT: usize = 5;
const GLYPH_SPACING: usize = 2;
const FILL: &str = "██";
const GAP: &str = "  ";

type Glyph = [&'static str; FONT_HEIGHT];

static GLYPHS: Lazy<HashMap<char, Glyph>> = Lazy::new(|| {
    HashMap::from([
        ('A', [" ### ", "#   #", "#####", "#   #", "#   #"]),
        ('B', ["#### ", "#   #", "#### ", "#   #", "#### "]),
        ('C', [" ####", "#    ", "#    ", "#    ", " ####"]),
        ('D', ["#### ", "#   #", "#   #", "#   #", "#### "]),
        ('E', ["#####", "#    ", "###  ", "#    ", "#####"]),
        ('F', ["#####", "#    ", "###  ", "#    ", "#    "]),
        ('G', [" ####", "#    ", "#  ##", "#   #", " ### "]),
        ('H', ["#   #", "#   #", "#####", "#   #", "#   #"]),
        ('I', ["#####", "  #  ", "  #  ", "  #  ", "#####"]),
        ('J', ["    #", "    #", "    #", "#   #", " ### "]),
        ('K', ["#   #", "#  # ", "##   ", "#  # ", "#   #"]),
        ('L', ["#    ", "#    ", "#    ", "#    ", "#####"]),
        ('M', ["#   #", "## ##", "# # #", "#   #", "#   #"]),
        ('N', ["#   #", "##  #", "# # #", "#  ##", "#   #"]),
        ('O', [" ### ", "#   #", "#   #", "#   #", " ### "]),
        ('P', ["#### ", "#   #", "#### ", "#    ", "#    "]),
        ('Q', [" ### ", "#   #", "#   #", "#  # ", " ## #"]),
        ('R', ["#### ", "#   #", "#### ", "#  # ", "#   #"]),
        ('S', [" ####", "#    ", " ### ", "    #", "#### "]),
        ('T', ["#####", "  #  ", "  #  ", "  #  ", "  #  "]),
        ('U', ["#   #", "#   #", "#   #", "#   #", " ### "]),
        ('V', ["#   #", "#   #", "#   #", " # # ", "  #  "]),
        ('W', ["#   #", "#   #", "# # #", "## ##", "#   #"]),
        ('X', ["#   #", " # # ", "  #  ", " # # ", "#   #"]),
        ('Y', ["#   #", " # # ", "  #  ", "  #  ", "  #  "]),
        ('Z', ["#####", "   # ", "  #  ", " #   ", "#####"]),
        ('0', [" ### ", "#  ##", "# # #", "##  #", " ### "]),
        ('1', ["  #  ", " ##  ", "  #  ", "  #  ", "#####"]),
        ('2', [" ### ", "#   #", "   # ", "  #  ", "#####"]),
        ('3', ["#### ", "    #", " ### ", "    #", "#### "]),
        ('4', ["#  # ", "#  # ", "#####", "   # ", "   # "]),
        ('5', ["#####", "#    ", "#### ", "    #", "#### "]),
        ('6', [" ### ", "#    ", "#### ", "#   #", " ### "]),
        ('7', ["#####", "    #", "   # ", "  #  ", "  #  "]),
        ('8', [" ### ", "#   #", " ### ", "#   #", " ### "]),
        ('9', [" ### ", "#   #", " ####", "    #", " ### "]),
        ('-', ["     ", "     ", " ### ", "     ", "     "]),
        ('?', [" ### ", "#   #", "   # ", "     ", "  #  "]),
        (' ', ["     ", "     ", "     ", "     ", "     "]),
    ])
});

/// Render `text` as chunky banner lines, one string per canvas row.
/// Unknown characters fall back to `?`.
pub fn render(text: &str) -> Vec<String> {
    let content: Vec<char> = text.chars().map(|c| c.to_ascii_uppercase()).collect();
    if content.is_empty() {
        return vec![String::new(); FONT_HEIGHT];
    }

    (0..FONT_HEIGHT)
        .map(|row_idx| {
            let mut line = String::new();
            for (pos, ch) in content.iter().enumerate() {
                if pos > 0 {
                    line.push_str(&" ".repeat(GLYPH_SPACING));
                }
                let glyph = GLYPHS.get(ch).or_else(|| GLYPHS.get(&'?')).unwrap();
                for cell in glyph[row_idx].chars() {
                    line.push_str(if cell == '#' { FILL } else { GAP });
                }
            }
            line.trim_end().to_string()
        })
        .collect()
}
