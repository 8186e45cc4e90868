include!(concat!(env!("OUT_DIR"), "/lessons.rs"));

/// A lesson file with its name and YAML source
#[derive(Debug, Clone)]
pub struct LessonSource {
    pub name: String,
    pub content: String,
}

/// Get all embedded lessons, ordered by name
pub fn get_all_lessons() -> Vec<LessonSource> {
    LESSONS
        .iter()
        .map(|(name, content)| LessonSource {
            name: name.to_string(),
            content: content.to_string(),
        })
        .collect()
}

/// Get a lesson by name
pub fn get_lesson(name: &str) -> Option<LessonSource> {
    LESSONS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(name, content)| LessonSource {
            name: name.to_string(),
            content: content.to_string(),
        })
}

/// List all lesson names
pub fn list_lessons() -> Vec<&'static str> {
    LESSONS.iter().map(|(name, _)| *name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_lessons_present() {
        let names = list_lessons();
        for expected in ["chords", "do-re-mi", "intervals", "twinkle"] {
            assert!(names.contains(&expected), "missing lesson {}", expected);
        }
    }

    #[test]
    fn test_get_lesson() {
        let lesson = get_lesson("twinkle").unwrap();
        assert!(lesson.content.contains("id: twinkle"));
        assert!(lesson.content.contains('\n'));
        assert!(get_lesson("nope").is_none());
    }
}
