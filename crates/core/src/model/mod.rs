mod ids;
mod list;
mod progress;
mod session;
mod word;

pub use ids::ListId;
pub use list::{List, ListError};
pub use progress::DailyProgressRecord;
pub use session::{AnswerCheck, MasteryState, QuizMode, SessionWord, WordSource};
pub use word::{WordEntry, WordError};
