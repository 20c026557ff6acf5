use wasm_bindgen::JsValue;

#[derive(Debug)]
pub enum TrailError {
    XmlParse(quick_xml::Error),
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },
    InvalidAttribute {
        element: &'static str,
        attribute: &'static str,
        value: String,
    },
    InvalidIndex {
        index: usize,
        len: usize,
    },
    EmptyPath {
        markers: usize,
    },
    NoTrackPoints,
}

impl std::fmt::Display for TrailError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::XmlParse(e) => write!(f, "XML parse error: {e}"),
            Self::MissingAttribute { element, attribute } => {
                write!(f, "Missing attribute '{attribute}' on <{element}>")
            }
            Self::InvalidAttribute {
                element,
                attribute,
                value,
            } => write!(
                f,
                "Invalid value '{value}' for attribute '{attribute}' on <{element}>"
            ),
            Self::InvalidIndex { index, len } => {
                write!(f, "Path index {index} out of range for path of {len} points")
            }
            Self::EmptyPath { markers } => {
                write!(f, "Cannot place {markers} stamp(s) on a path without points")
            }
            Self::NoTrackPoints => write!(f, "GPX contains no track or route points"),
        }
    }
}

impl std::error::Error for TrailError {}

impl From<quick_xml::Error> for TrailError {
    fn from(e: quick_xml::Error) -> Self {
        Self::XmlParse(e)
    }
}

impl From<TrailError> for JsValue {
    fn from(e: TrailError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}
