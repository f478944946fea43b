#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Book {
    pub title: &'static str,
    pub author: &'static str,
}

const CATALOG: [Book; 10] = [
    Book {
        title: "The Imaginary Journey",
        author: "John Imaginer",
    },
    Book {
        title: "Dreams of Fiction",
        author: "Alice Dreamer",
    },
    Book {
        title: "Fantasy Realm",
        author: "Bob Fantasy",
    },
    Book {
        title: "Enchanted Tales",
        author: "Eva Enchanter",
    },
    Book {
        title: "Mythical Adventures",
        author: "Mike Myth",
    },
    Book {
        title: "Whimsical Wonders",
        author: "Wendy Whimsy",
    },
    Book {
        title: "Fables and Fairytales",
        author: "Frank Fabulist",
    },
    Book {
        title: "Magical Realms",
        author: "Molly Magician",
    },
    Book {
        title: "Epic Quests",
        author: "Eric Epic",
    },
    Book {
        title: "Wizards and Wonders",
        author: "Walter Wizard",
    },
];

/// The fixed listing shown to signed-in users, in display order.
pub fn catalog() -> &'static [Book] {
    &CATALOG
}
