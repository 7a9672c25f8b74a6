use crate::errors::DomainError;
use crate::habits;
use crate::models::{generate_id, CategoryDef, SubItemDef};
use crate::storage::{self, Store};

/// Sentinel category for habits whose category definition was deleted.
pub const UNASSIGNED: &str = "Unassigned";

const DEFAULT_CATALOG: &[(&str, &[&str])] = &[
    (
        "Morning Routine",
        &[
            "Pepper Water",
            "Ginger Water",
            "Yoga",
            "Meditation",
            "Warm Water + Lemon",
            "Read News",
            "Make Bed",
        ],
    ),
    (
        "Supplements",
        &[
            "Shilajit Drops",
            "Shilajit Resin",
            "Ashwagandha Tablet",
            "Brazil Nut",
            "Magnesium",
            "Multivitamin",
            "Omega-3",
            "Creatine",
        ],
    ),
    (
        "Diet",
        &[
            "Dinner Alert",
            "Stop eating",
            "Hydration",
            "Intermittent Fasting Start",
            "No Sugar Check",
            "Protein Shake",
            "Fruit Bowl",
        ],
    ),
    (
        "Fitness",
        &[
            "Gym Workout",
            "Home Workout",
            "Running",
            "Walking",
            "Stretching",
            "Pushups",
            "Squats",
        ],
    ),
    (
        "Education",
        &[
            "Physics Study",
            "Maths Practice",
            "Chemistry",
            "Biology",
            "Coding",
            "History",
            "Language Learning",
        ],
    ),
    (
        "Sleep",
        &["Sleep Tracking", "Nap", "Wind Down Routine", "No Screens"],
    ),
    (
        "Work",
        &["Deep Work Session", "Email Clearance", "Planning", "Meeting Prep"],
    ),
    (
        "Mindfulness",
        &["Breathing Exercise", "Gratitude Journal", "Visualization", "Silence"],
    ),
];

fn save(store: &mut Store, uid: &str, categories: &[CategoryDef]) {
    store.set_json(&storage::categories_key(uid), &categories);
}

/// Seeds the default table only when the collection has never been
/// written; an existing (even empty) collection is left untouched.
pub fn categories(store: &mut Store, uid: &str) -> Vec<CategoryDef> {
    let key = storage::categories_key(uid);
    if store.get(&key).is_none() {
        let seeded: Vec<CategoryDef> = DEFAULT_CATALOG
            .iter()
            .map(|(name, items)| CategoryDef {
                id: generate_id(),
                name: (*name).to_string(),
                items: items
                    .iter()
                    .map(|item| SubItemDef {
                        id: generate_id(),
                        name: (*item).to_string(),
                    })
                    .collect(),
                is_default: true,
            })
            .collect();
        save(store, uid, &seeded);
        return seeded;
    }

    store.get_json_or(&key, Vec::new())
}

pub fn add_category(store: &mut Store, uid: &str, name: &str) -> Result<CategoryDef, DomainError> {
    let mut all = categories(store, uid);
    if all.iter().any(|c| c.name.eq_ignore_ascii_case(name)) {
        return Err(DomainError::DuplicateCategory(name.to_string()));
    }

    let category = CategoryDef {
        id: generate_id(),
        name: name.to_string(),
        items: Vec::new(),
        is_default: false,
    };
    all.push(category.clone());
    save(store, uid, &all);
    Ok(category)
}

/// Rename, then rewrite every habit still carrying the old name. Renaming
/// onto an existing name is allowed (last write wins).
pub fn update_category(
    store: &mut Store,
    uid: &str,
    id: &str,
    new_name: &str,
) -> Result<(), DomainError> {
    let mut all = categories(store, uid);
    let category = all
        .iter_mut()
        .find(|c| c.id == id)
        .ok_or(DomainError::CategoryNotFound)?;
    let old_name = std::mem::replace(&mut category.name, new_name.to_string());
    save(store, uid, &all);

    let mut registry = habits::habits(store, uid);
    let mut touched = false;
    for habit in registry.iter_mut().filter(|h| h.category == old_name) {
        habit.category = new_name.to_string();
        touched = true;
    }
    if touched {
        habits::save(store, uid, &registry);
    }
    Ok(())
}

/// Removes the definition and parks its habits under "Unassigned".
pub fn delete_category(store: &mut Store, uid: &str, id: &str) -> Result<(), DomainError> {
    let mut all = categories(store, uid);
    let position = all
        .iter()
        .position(|c| c.id == id)
        .ok_or(DomainError::CategoryNotFound)?;
    let removed = all.remove(position);
    save(store, uid, &all);

    let mut registry = habits::habits(store, uid);
    let mut touched = false;
    for habit in registry.iter_mut().filter(|h| h.category == removed.name) {
        habit.category = UNASSIGNED.to_string();
        touched = true;
    }
    if touched {
        habits::save(store, uid, &registry);
    }
    Ok(())
}

/// A case-insensitive duplicate within the category is silently ignored.
pub fn add_sub_item(store: &mut Store, uid: &str, category_id: &str, name: &str) {
    let mut all = categories(store, uid);
    let Some(category) = all.iter_mut().find(|c| c.id == category_id) else {
        return;
    };
    if category
        .items
        .iter()
        .any(|i| i.name.eq_ignore_ascii_case(name))
    {
        return;
    }
    category.items.push(SubItemDef {
        id: generate_id(),
        name: name.to_string(),
    });
    save(store, uid, &all);
}

/// Cascades the rename to habits matching the (category, title) pair.
pub fn update_sub_item(store: &mut Store, uid: &str, category_id: &str, item_id: &str, new_name: &str) {
    let mut all = categories(store, uid);
    let Some(category) = all.iter_mut().find(|c| c.id == category_id) else {
        return;
    };
    let Some(item) = category.items.iter_mut().find(|i| i.id == item_id) else {
        return;
    };
    let old_name = std::mem::replace(&mut item.name, new_name.to_string());
    let category_name = category.name.clone();
    save(store, uid, &all);

    let mut registry = habits::habits(store, uid);
    let mut touched = false;
    for habit in registry
        .iter_mut()
        .filter(|h| h.category == category_name && h.title == old_name)
    {
        habit.title = new_name.to_string();
        touched = true;
    }
    if touched {
        habits::save(store, uid, &registry);
    }
}

/// Removes a sub-item and *deletes* the matching habits outright, unlike
/// category deletion, which preserves them.
pub fn delete_sub_item(store: &mut Store, uid: &str, category_id: &str, item_id: &str) {
    let mut all = categories(store, uid);
    let Some(category) = all.iter_mut().find(|c| c.id == category_id) else {
        return;
    };
    let Some(position) = category.items.iter().position(|i| i.id == item_id) else {
        return;
    };
    let removed = category.items.remove(position);
    let category_name = category.name.clone();
    save(store, uid, &all);

    let mut registry = habits::habits(store, uid);
    let before = registry.len();
    registry.retain(|h| !(h.category == category_name && h.title == removed.name));
    if registry.len() != before {
        habits::save(store, uid, &registry);
    }
}
