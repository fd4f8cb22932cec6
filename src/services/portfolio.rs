use crate::error::{StudioError, StudioResult};
use crate::models::{ImageDraft, PortfolioCategory, PortfolioProject};

/// Category slug: lower-case, spaces become `-`, anything outside `[A-Za-z0-9_-]` is dropped.
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c == ' ' { '-' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// Bucket-safe form of an uploaded file name: `[^a-z0-9.]` becomes `-`.
pub fn storage_file_slug(file_name: &str) -> String {
    file_name
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Position a freshly created category gets
pub fn next_category_position(categories: &[PortfolioCategory]) -> i32 {
    categories.len() as i32 + 1
}

pub fn active_categories(categories: &[PortfolioCategory]) -> Vec<&PortfolioCategory> {
    categories.iter().filter(|c| c.active).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Swap an image with its neighbour. Moving past either end leaves the list alone.
pub fn move_image(images: &mut [ImageDraft], index: usize, direction: Direction) -> usize {
    let target = match direction {
        Direction::Up if index > 0 => index - 1,
        Direction::Down if index + 1 < images.len() => index + 1,
        _ => return index,
    };
    images.swap(index, target);
    target
}

pub fn validate_category(category: &PortfolioCategory) -> StudioResult<()> {
    if category.name.trim().is_empty() {
        return Err(StudioError::validation("name is required"));
    }
    if category.slug.trim().is_empty() {
        return Err(StudioError::validation("slug is required"));
    }
    Ok(())
}

pub fn validate_project(project: &PortfolioProject) -> StudioResult<()> {
    if project.title.trim().is_empty() {
        return Err(StudioError::validation("title is required"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drafts(urls: &[&str]) -> Vec<ImageDraft> {
        urls.iter()
            .map(|u| ImageDraft {
                url: u.to_string(),
                title: None,
            })
            .collect()
    }

    fn urls(images: &[ImageDraft]) -> Vec<&str> {
        images.iter().map(|i| i.url.as_str()).collect()
    }

    #[test]
    fn slug_from_category_name() {
        assert_eq!(slugify("Ensaios Externos"), "ensaios-externos");
        assert_eq!(slugify("Produtos & Moda!"), "produtos--moda");
        assert_eq!(slugify("Casamentos"), "casamentos");
        assert_eq!(slugify("Ação 2024"), "ao-2024");
    }

    #[test]
    fn storage_slug_keeps_dots() {
        assert_eq!(storage_file_slug("IMG 0042 Final.JPG"), "img-0042-final.jpg");
        assert_eq!(storage_file_slug("foto_1.png"), "foto-1.png");
    }

    #[test]
    fn images_move_within_bounds() {
        let mut images = drafts(&["a", "b", "c"]);

        assert_eq!(move_image(&mut images, 0, Direction::Up), 0);
        assert_eq!(urls(&images), ["a", "b", "c"]);

        assert_eq!(move_image(&mut images, 2, Direction::Down), 2);
        assert_eq!(urls(&images), ["a", "b", "c"]);

        assert_eq!(move_image(&mut images, 2, Direction::Up), 1);
        assert_eq!(urls(&images), ["a", "c", "b"]);

        assert_eq!(move_image(&mut images, 0, Direction::Down), 1);
        assert_eq!(urls(&images), ["c", "a", "b"]);
    }

    #[test]
    fn new_category_goes_last() {
        let mut first = PortfolioCategory::new(1);
        first.active = false;
        let categories = vec![first, PortfolioCategory::new(2)];

        assert_eq!(next_category_position(&categories), 3);
        assert_eq!(active_categories(&categories).len(), 1);
    }
}
