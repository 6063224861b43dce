use std::cmp::Ordering;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::models::{SortMode, StudentRecord, ViewStats};

/// Filters by case-insensitive name substring, then applies one stable sort.
/// The input slice is never reordered.
pub fn compute_view<'a>(
    students: &'a [StudentRecord],
    search: &str,
    mode: SortMode,
) -> Vec<&'a StudentRecord> {
    let needle = search.trim().to_lowercase();
    let mut list: Vec<&StudentRecord> = students
        .iter()
        .filter(|student| needle.is_empty() || student.name.to_lowercase().contains(&needle))
        .collect();

    match mode {
        SortMode::Newest => list.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortMode::Oldest => list.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortMode::AvgHigh => list.sort_by(|a, b| compare_f64(b.avg, a.avg)),
        SortMode::AvgLow => list.sort_by(|a, b| compare_f64(a.avg, b.avg)),
        SortMode::NameAz => list.sort_by(|a, b| locale_compare(&a.name, &b.name)),
        SortMode::NameZa => list.sort_by(|a, b| locale_compare(&b.name, &a.name)),
        SortMode::Unsorted => {}
    }

    list
}

pub fn compute_stats(students: &[StudentRecord], view: &[&StudentRecord]) -> ViewStats {
    ViewStats {
        shown: view.len(),
        total: students.len(),
    }
}

fn compare_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Dictionary-style name ordering. Base letters compare first with accents and case
/// folded away, so "Émile" sits among the E names. Ties fall to the accented form,
/// then to case with the lowercase spelling first. Only identical strings compare equal.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| accented_letters(a).cmp(accented_letters(b)))
        .then_with(|| b.cmp(a))
}

fn base_letters(name: &str) -> impl Iterator<Item = char> + '_ {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

fn accented_letters(name: &str) -> impl Iterator<Item = char> + '_ {
    name.nfd().flat_map(char::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::build;
    use crate::models::{Identity, Scores};

    fn student(name: &str, avg: f64, created_at: i64) -> StudentRecord {
        build(
            name,
            Scores {
                math: avg,
                english: avg,
                science: avg,
            },
            Some(Identity {
                id: format!("id-{name}").into(),
                created_at,
            }),
        )
    }

    fn roster() -> Vec<StudentRecord> {
        vec![
            student("Avery Lee", 72.0, 3_000),
            student("jules Moreno", 91.0, 1_000),
            student("Kiara Patel", 64.0, 2_000),
            student("Bo Avery", 88.0, 4_000),
        ]
    }

    fn names(view: &[&StudentRecord]) -> Vec<String> {
        view.iter().map(|s| s.name.clone()).collect()
    }

    #[test]
    fn empty_search_keeps_insertion_order() {
        let students = roster();
        let view = compute_view(&students, "   ", SortMode::Unsorted);
        assert_eq!(
            names(&view),
            vec!["Avery Lee", "jules Moreno", "Kiara Patel", "Bo Avery"]
        );
    }

    #[test]
    fn search_is_trimmed_and_case_insensitive() {
        let students = roster();
        let view = compute_view(&students, "  AVERY ", SortMode::Unsorted);
        assert_eq!(names(&view), vec!["Avery Lee", "Bo Avery"]);
        for record in &view {
            assert!(record.name.to_lowercase().contains("avery"));
            assert!(students.contains(*record));
        }
    }

    #[test]
    fn sorts_by_created_at() {
        let students = roster();
        let newest = compute_view(&students, "", SortMode::Newest);
        assert_eq!(
            names(&newest),
            vec!["Bo Avery", "Avery Lee", "Kiara Patel", "jules Moreno"]
        );
        let oldest = compute_view(&students, "", SortMode::Oldest);
        assert_eq!(
            names(&oldest),
            vec!["jules Moreno", "Kiara Patel", "Avery Lee", "Bo Avery"]
        );
    }

    #[test]
    fn sorts_by_average() {
        let students = roster();
        let high = compute_view(&students, "", SortMode::AvgHigh);
        assert_eq!(
            names(&high),
            vec!["jules Moreno", "Bo Avery", "Avery Lee", "Kiara Patel"]
        );
        let low = compute_view(&students, "", SortMode::AvgLow);
        assert_eq!(
            names(&low),
            vec!["Kiara Patel", "Avery Lee", "Bo Avery", "jules Moreno"]
        );
    }

    #[test]
    fn name_sorts_ignore_case_and_reverse_each_other() {
        let students = roster();
        let az = compute_view(&students, "", SortMode::NameAz);
        assert_eq!(
            names(&az),
            vec!["Avery Lee", "Bo Avery", "jules Moreno", "Kiara Patel"]
        );
        let mut za = names(&compute_view(&students, "", SortMode::NameZa));
        za.reverse();
        assert_eq!(names(&az), za);
    }

    #[test]
    fn equal_keys_keep_input_order() {
        let students = vec![
            student("Avery", 80.0, 1),
            student("Bo", 80.0, 2),
            student("Cy", 80.0, 3),
        ];
        let view = compute_view(&students, "", SortMode::AvgHigh);
        assert_eq!(names(&view), vec!["Avery", "Bo", "Cy"]);
    }

    #[test]
    fn lowercase_sorts_before_uppercase_twin() {
        assert_eq!(locale_compare("ava", "Ava"), Ordering::Less);
        assert_eq!(locale_compare("Ava", "Ava"), Ordering::Equal);
        assert_eq!(locale_compare("avery", "Bo"), Ordering::Less);
    }

    #[test]
    fn accented_names_sort_with_their_base_letter() {
        assert_eq!(locale_compare("Émile", "Zoe"), Ordering::Less);
        assert_eq!(locale_compare("élan", "Fay"), Ordering::Less);
        assert_eq!(locale_compare("Elan", "Émile"), Ordering::Less);
        assert_eq!(locale_compare("Emile", "Émile"), Ordering::Less);
        assert_eq!(locale_compare("Émile", "Émile"), Ordering::Equal);

        let students = vec![
            student("Zoe", 80.0, 1),
            student("Émile", 80.0, 2),
            student("Fay", 80.0, 3),
            student("élan", 80.0, 4),
        ];
        let az = names(&compute_view(&students, "", SortMode::NameAz));
        assert_eq!(az, vec!["élan", "Émile", "Fay", "Zoe"]);
        let mut za = names(&compute_view(&students, "", SortMode::NameZa));
        za.reverse();
        assert_eq!(az, za);
    }

    #[test]
    fn stats_count_view_against_collection() {
        let students = roster();
        let view = compute_view(&students, "kiara", SortMode::Unsorted);
        assert_eq!(compute_stats(&students, &view), ViewStats { shown: 1, total: 4 });
        let input_before = students.clone();
        let _ = compute_view(&students, "", SortMode::NameZa);
        assert_eq!(students, input_before);
    }
}
