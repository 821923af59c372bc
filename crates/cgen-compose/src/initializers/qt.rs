//! Qt event loop support for deployments hosting widgets.
//!
//! Both variants run a `QApplication` in a dedicated thread started before
//! the deployment's components and joined after they stop.

use crate::error::Result;
use crate::initializer::{BuildTarget, GlobalInitializer};

const GLOBAL_SCOPE: &str = r#"static int QT_ARGC = 1;
static char const* QT_ARGV[] = { "orogen", nullptr };
#include <pthread.h>
#include <QApplication>

void* qt_thread_main(void*)
{
    QApplication *qapp = new QApplication(QT_ARGC, const_cast<char**>(QT_ARGV));
    qapp->setQuitOnLastWindowClosed(false);
    // Other threads talk to the event loop through postEvent only, which is
    // safe before the QApplication exists.
    qapp->exec();
    return NULL;
}
"#;

const INIT: &str = "pthread_t qt_thread;
pthread_create(&qt_thread, NULL, qt_thread_main, NULL);
";

const EXIT: &str = "QApplication::instance()->exit();
pthread_join(qt_thread, NULL);
";

const QT4_TASK_LIBRARY: &str = "find_package(Qt4 REQUIRED)
include(${QT_USE_FILE})
include_directories(${QT_INCLUDE_DIR})
link_directories(${QT_LIBRARY_DIR})
set(CMAKE_AUTOMOC true)

target_link_libraries(${{{project|upper}}_TASKLIB_NAME}
    ${OrocosRTT_LIBRARIES}
    ${QT_LIBRARIES}
    ${{{project|upper}}_TASKLIB_DEPENDENT_LIBRARIES})
";

const QT4_DEPLOYMENT: &str = "find_package(Qt4 REQUIRED)
include(${QT_USE_FILE})
include_directories(${QT_INCLUDE_DIR})
link_directories(${QT_LIBRARY_DIR})
target_link_libraries({{deployment}} ${QT_LIBRARIES})
set(CMAKE_AUTOMOC true)
";

const QT5_TASK_LIBRARY: &str = "find_package(Rock REQUIRED)
rock_find_qt5(Core Gui Widgets UiTools)
target_link_libraries(${{{project|upper}}_TASKLIB_NAME} PUBLIC
    ${OrocosRTT_LIBRARIES}
    Qt5::Core
    Qt5::Gui
    Qt5::Widgets
    Qt5::UiTools
    ${{{project|upper}}_TASKLIB_DEPENDENT_LIBRARIES})
set(CMAKE_AUTOMOC true)
";

const QT5_DEPLOYMENT: &str = "find_package(Rock REQUIRED)
rock_find_qt5(Core Gui Widgets UiTools)
target_link_libraries({{deployment}} Qt5::Core Qt5::Gui Qt5::Widgets Qt5::UiTools)
set(CMAKE_AUTOMOC true)
";

const QT5_MODULES: &[&str] = &["Qt5Core", "Qt5Gui", "Qt5Widgets", "Qt5UiTools"];

/// pkg-config discovery of the Qt5 modules, recorded as task library
/// dependencies.
fn qt5_dependencies() -> String {
    let mut text = String::new();
    for module in QT5_MODULES {
        text.push_str(&format!(
            "pkg_check_modules({module} REQUIRED {module})\n\
             include_directories(${{{module}_INCLUDE_DIRS}})\n\
             link_directories(${{{module}_LIBRARY_DIRS}})\n"
        ));
    }
    text.push('\n');
    for module in QT5_MODULES {
        text.push_str(&format!(
            "list(APPEND {{{{project|upper}}}}_TASKLIB_DEPENDENT_LIBRARIES ${{{module}_LIBRARIES}})\n"
        ));
    }
    text
}

/// The `qt` initializer (Qt 4).
pub fn qt4() -> Result<GlobalInitializer> {
    GlobalInitializer::new("qt")
        .with_global_scope(GLOBAL_SCOPE)?
        .with_init(INIT)?
        .with_exit(EXIT)?
        .with_build(BuildTarget::TaskLibrary, QT4_TASK_LIBRARY)?
        .with_build(BuildTarget::Deployment, QT4_DEPLOYMENT)
}

/// The `qt5` initializer.
pub fn qt5() -> Result<GlobalInitializer> {
    GlobalInitializer::new("qt5")
        .with_global_scope(GLOBAL_SCOPE)?
        .with_init(INIT)?
        .with_exit(EXIT)?
        .with_build(BuildTarget::TaskLibrary, QT5_TASK_LIBRARY)?
        .with_build(BuildTarget::Deployment, QT5_DEPLOYMENT)?
        .with_build(BuildTarget::TaskLibraryDependencies, &qt5_dependencies())
}
