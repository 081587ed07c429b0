//! Prompt text for LLM report writers.

use crate::{ReportError, ReportInput};

/// System prompt: a Hebrew business-licensing consultant writing for owners.
pub const SYSTEM_PROMPT: &str = "\
אתה יועץ רישוי עסקים בישראל. תקבל פרופיל של עסק ורשימת דרישות רגולטוריות \
שנמצאו רלוונטיות עבורו, בפורמט JSON.
כתוב דוח ציות אישי בעברית פשוטה וברורה לבעל העסק:
- פתח בסיכום קצר של מאפייני העסק.
- קבץ את הדרישות לפי הרשות האחראית, והצג קודם דרישות חובה.
- לכל דרישה הסבר במשפט או שניים מה נדרש ומדוע היא חלה על העסק.
- סיים ברשימת צעדים מעשיים לביצוע.
אל תוסיף דרישות שאינן מופיעות ברשימה. אם הרשימה ריקה, ציין שלא נמצאו דרישות מתאימות.";

/// User message: the input as pretty-printed JSON.
pub fn user_message(input: &ReportInput) -> Result<String, ReportError> {
    let json = serde_json::to_string_pretty(input).map_err(ReportError::Encode)?;
    Ok(format!("פרטי העסק והדרישות שנמצאו:\n{json}"))
}
