//! Fuzzy skill overlap and the 0-100 match score.
//!
//! Two terms match when either one, lowercased, is a substring of the other.
//! There is no aliasing: "JS" never matches "JavaScript".

const SKILL_WEIGHT: f64 = 0.7;
const INTEREST_WEIGHT: f64 = 0.3;
const INTEREST_SCALE: f64 = 30.0;

fn terms_match(a: &str, b: &str) -> bool {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    a.contains(&b) || b.contains(&a)
}

/// Candidate skills, in input order, that match at least one required skill.
pub fn overlap(candidate_skills: &[String], required_skills: &[String]) -> Vec<String> {
    candidate_skills
        .iter()
        .filter(|skill| required_skills.iter().any(|req| terms_match(skill, req)))
        .cloned()
        .collect()
}

fn skill_score(matched: usize, required: usize) -> f64 {
    (100.0 * matched as f64 / required.max(1) as f64).clamp(0.0, 100.0)
}

fn interest_score(interests: &[String], title: &str, description: &str) -> f64 {
    let haystack = format!("{} {}", title, description).to_lowercase();
    let hits = interests
        .iter()
        .filter(|interest| haystack.contains(&interest.to_lowercase()))
        .count();
    INTEREST_SCALE * hits as f64 / interests.len().max(1) as f64
}

/// Combines an already computed overlap size with the interest signal.
pub fn score_with_overlap(
    matched: usize,
    required_skills: &[String],
    candidate_interests: &[String],
    title: &str,
    description: &str,
) -> u8 {
    let skills = skill_score(matched, required_skills.len());
    let interests = interest_score(candidate_interests, title, description);
    (SKILL_WEIGHT * skills + INTEREST_WEIGHT * interests)
        .round()
        .clamp(0.0, 100.0) as u8
}

pub fn score(
    candidate_skills: &[String],
    required_skills: &[String],
    candidate_interests: &[String],
    title: &str,
    description: &str,
) -> u8 {
    let matched = overlap(candidate_skills, required_skills).len();
    score_with_overlap(matched, required_skills, candidate_interests, title, description)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn overlap_is_case_insensitive_substring_both_ways() {
        let required = strings(&["Python", "React.js", "MongoDB"]);
        let candidate = strings(&["python", "React", "Mongo", "Django"]);
        assert_eq!(
            overlap(&candidate, &required),
            strings(&["python", "React", "Mongo"])
        );
    }

    #[test]
    fn no_alias_matching() {
        let matched = overlap(&strings(&["JS"]), &strings(&["JavaScript"]));
        assert!(matched.is_empty());
    }

    #[test]
    fn single_skill_of_three_scores_23() {
        let result = score(
            &strings(&["python", "Django"]),
            &strings(&["Python", "React", "MongoDB"]),
            &[],
            "Campus app",
            "A web app",
        );
        assert_eq!(result, 23);
    }

    #[test]
    fn interests_contribute_at_most_nine_points() {
        let result = score(
            &strings(&["Rust"]),
            &strings(&["Rust"]),
            &strings(&["robotics", "music", "chess"]),
            "Robotics club",
            "Build a rover",
        );
        // 0.7 * 100 + 0.3 * 10
        assert_eq!(result, 73);
    }

    #[test]
    fn empty_requirements_give_zero_skill_score() {
        assert_eq!(score(&strings(&["Rust"]), &[], &[], "t", "d"), 0);
        assert_eq!(score(&[], &[], &strings(&["t"]), "t", "d"), 9);
    }

    #[test]
    fn score_is_clamped_when_many_skills_hit_one_requirement() {
        let result = score(
            &strings(&["React", "React Native", "react.js"]),
            &strings(&["React"]),
            &strings(&["app"]),
            "app",
            "",
        );
        assert_eq!(result, 79);
        assert!(result <= 100);
    }

    #[test]
    fn score_stays_within_bounds() {
        let pools = [
            strings(&[]),
            strings(&["a"]),
            strings(&["a", "ab", "abc", "b"]),
            strings(&["Rust", "Go", "SQL", "rust"]),
        ];
        for skills in &pools {
            for required in &pools {
                for interests in &pools {
                    let s = score(skills, required, interests, "abc rust", "go sql");
                    assert!(s <= 100, "score {} out of range", s);
                }
            }
        }
    }
}
