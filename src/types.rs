#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Completed,
}

/// Where the typing cursor sits once a run is over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CursorStatus {
    pub line: usize,
    pub column: usize,
}

/// One entry of the line-number gutter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineRow {
    Numbered(usize),
    Placeholder(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Language {
    JavaScript,
}

impl Language {
    pub fn label(self) -> &'static str {
        match self {
            Language::JavaScript => "JavaScript",
        }
    }
}

pub enum TextSource {
    Sample,
    Empty,
    Fixed(String),
}
